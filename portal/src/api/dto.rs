use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::entity::{note, user, work_center};

// ---------- response envelope ----------

/// The JSON envelope every endpoint speaks: `{ success, message?, data? }`.
/// Errors go through `ApiError`, which renders the `success: false` half.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn message_with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

// ---------- auth ----------

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "reEnterPassword")]
    pub re_enter_password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl From<user::Model> for UserResponse {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            role: m.role,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: UserResponse,
}

// ---------- maintenance requests ----------

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<String>,
    pub r#type: Option<String>,
    pub team_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    pub equipment_id: Option<i32>,
    pub work_center_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub r#type: Option<String>,
    pub subject: Option<String>,
    pub equipment_id: Option<i32>,
    pub work_center_id: Option<i32>,
    pub team_id: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    pub created_by_user_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequestBody {
    pub r#type: Option<String>,
    pub subject: Option<String>,
    pub equipment_id: Option<i32>,
    pub work_center_id: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    pub duration_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AssignBody {
    pub user_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: Option<String>,
    pub duration_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct NoteBody {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedRequest {
    pub id: i32,
    pub team_id: Option<i32>,
    pub equipment_name: Option<String>,
    pub work_center_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedId {
    pub id: i32,
}

/// One row of the list view: the request plus display names resolved from
/// the left-joined equipment/work-center/team/assignee and the creator.
#[derive(Debug, Serialize, FromQueryResult)]
pub struct RequestRow {
    pub id: i32,
    #[serde(rename = "type")]
    pub request_type: String,
    pub subject: String,
    pub equipment_id: Option<i32>,
    pub work_center_id: Option<i32>,
    pub team_id: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    pub status: String,
    pub assigned_to_user_id: Option<i32>,
    pub duration_hours: Option<f64>,
    pub created_by_user_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub equipment_name: Option<String>,
    pub serial_number: Option<String>,
    pub department: Option<String>,
    pub assigned_employee_name: Option<String>,
    pub work_center_name: Option<String>,
    pub team_name: Option<String>,
    pub assigned_to_name: Option<String>,
    pub created_by_name: String,
}

/// Calendar rows skip the creator/serial details the calendar UI never shows.
#[derive(Debug, Serialize, FromQueryResult)]
pub struct CalendarRow {
    pub id: i32,
    #[serde(rename = "type")]
    pub request_type: String,
    pub subject: String,
    pub equipment_id: Option<i32>,
    pub work_center_id: Option<i32>,
    pub team_id: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    pub status: String,
    pub assigned_to_user_id: Option<i32>,
    pub duration_hours: Option<f64>,
    pub created_by_user_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub equipment_name: Option<String>,
    pub work_center_name: Option<String>,
    pub team_name: Option<String>,
    pub assigned_to_name: Option<String>,
}

#[derive(Debug, Serialize, FromQueryResult)]
pub struct RequestDetailRow {
    pub id: i32,
    #[serde(rename = "type")]
    pub request_type: String,
    pub subject: String,
    pub equipment_id: Option<i32>,
    pub work_center_id: Option<i32>,
    pub team_id: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    pub status: String,
    pub assigned_to_user_id: Option<i32>,
    pub duration_hours: Option<f64>,
    pub created_by_user_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub equipment_name: Option<String>,
    pub serial_number: Option<String>,
    pub department: Option<String>,
    pub assigned_employee_name: Option<String>,
    pub work_center_name: Option<String>,
    pub team_name: Option<String>,
    pub assigned_to_name: Option<String>,
    pub assigned_to_email: Option<String>,
    pub created_by_name: String,
    pub created_by_email: String,
}

#[derive(Debug, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: RequestDetailRow,
    pub notes: Vec<NoteResponse>,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: i32,
    pub request_id: i32,
    pub message: String,
    pub created_at: NaiveDateTime,
}

impl From<note::Model> for NoteResponse {
    fn from(m: note::Model) -> Self {
        Self {
            id: m.id,
            request_id: m.request_id,
            message: m.message,
            created_at: m.created_at,
        }
    }
}

// ---------- work centers ----------

#[derive(Debug, Deserialize)]
pub struct ListWorkCentersQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkCenterBody {
    pub name: Option<String>,
    pub code: Option<String>,
    pub tag: Option<String>,
    pub cost_per_hour: Option<f64>,
    pub capacity_per_hour: Option<f64>,
    pub time_efficiency_pct: Option<f64>,
    pub oee_target_pct: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkCenterBody {
    pub name: Option<String>,
    pub code: Option<String>,
    pub tag: Option<String>,
    pub cost_per_hour: Option<f64>,
    pub capacity_per_hour: Option<f64>,
    pub time_efficiency_pct: Option<f64>,
    pub oee_target_pct: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkCenterResponse {
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
    pub tag: Option<String>,
    pub cost_per_hour: f64,
    pub capacity_per_hour: f64,
    pub time_efficiency_pct: f64,
    pub oee_target_pct: f64,
    pub status: String,
}

impl From<work_center::Model> for WorkCenterResponse {
    fn from(m: work_center::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            code: m.code,
            tag: m.tag,
            cost_per_hour: m.cost_per_hour,
            capacity_per_hour: m.capacity_per_hour,
            time_efficiency_pct: m.time_efficiency_pct,
            oee_target_pct: m.oee_target_pct,
            status: m.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkCenterDetail {
    #[serde(flatten)]
    pub work_center: WorkCenterResponse,
    pub alternatives: Vec<AlternativeRow>,
}

#[derive(Debug, Serialize, FromQueryResult)]
pub struct AlternativeRow {
    pub id: i32,
    pub alt_id: i32,
    pub alt_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddAlternativeBody {
    pub alternative_work_center_id: Option<i32>,
}
