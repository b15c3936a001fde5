//! Maintenance-request lifecycle and read handlers.
//!
//! Writes go through the lifecycle rules in [`crate::lifecycle`]; reads build
//! joined selects that resolve display names for equipment, work center, team,
//! assignee, and creator in one query.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, ModelTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select, Set,
};

use crate::entity::{equipment, maintenance_request, note, team, team_member, user, work_center};
use crate::lifecycle::{RequestStatus, RequestTarget, RequestType, Role};

use super::{
    ApiError, AppState,
    dto::{
        AssignBody, CalendarQuery, CalendarRow, CreateRequestBody, CreatedId, CreatedRequest,
        Envelope, ListRequestsQuery, NoteBody, NoteResponse, RequestDetail, RequestDetailRow,
        RequestRow, StatusBody, UpdateRequestBody,
    },
};

// ---------- joined selects ----------

/// Both user joins need table aliases since assignee and creator hit the same
/// table. The creator join is inner: a request without a valid creator is a
/// broken row and should not surface.
fn joined_select() -> Select<maintenance_request::Entity> {
    use maintenance_request::Column;

    maintenance_request::Entity::find()
        .select_only()
        .column(Column::Id)
        .column_as(Column::RequestType, "request_type")
        .column(Column::Subject)
        .column(Column::EquipmentId)
        .column(Column::WorkCenterId)
        .column(Column::TeamId)
        .column(Column::ScheduledDate)
        .column(Column::Status)
        .column(Column::AssignedToUserId)
        .column(Column::DurationHours)
        .column(Column::CreatedByUserId)
        .column(Column::CreatedAt)
        .column(Column::UpdatedAt)
        .column_as(equipment::Column::Name, "equipment_name")
        .column_as(work_center::Column::Name, "work_center_name")
        .column_as(team::Column::Name, "team_name")
        .expr_as(
            Expr::col((Alias::new("assignee"), user::Column::Name)),
            "assigned_to_name",
        )
        .join(
            JoinType::LeftJoin,
            maintenance_request::Relation::Equipment.def(),
        )
        .join(
            JoinType::LeftJoin,
            maintenance_request::Relation::WorkCenter.def(),
        )
        .join(JoinType::LeftJoin, maintenance_request::Relation::Team.def())
        .join_as(
            JoinType::LeftJoin,
            maintenance_request::Relation::Assignee.def(),
            Alias::new("assignee"),
        )
}

/// The list and detail views additionally show equipment context and who
/// raised the request.
fn full_select() -> Select<maintenance_request::Entity> {
    joined_select()
        .column_as(equipment::Column::SerialNumber, "serial_number")
        .column_as(equipment::Column::Department, "department")
        .column_as(
            equipment::Column::AssignedEmployeeName,
            "assigned_employee_name",
        )
        .expr_as(
            Expr::col((Alias::new("creator"), user::Column::Name)),
            "created_by_name",
        )
        .join_as(
            JoinType::InnerJoin,
            maintenance_request::Relation::Creator.def(),
            Alias::new("creator"),
        )
}

// ---------- reads ----------

pub async fn list_requests(
    State(state): State<AppState>,
    Query(q): Query<ListRequestsQuery>,
) -> Result<Json<Envelope<Vec<RequestRow>>>, ApiError> {
    use maintenance_request::Column;

    let mut select = full_select();
    if let Some(status) = q.status.filter(|s| !s.is_empty()) {
        select = select.filter(Column::Status.eq(status));
    }
    if let Some(request_type) = q.r#type.filter(|s| !s.is_empty()) {
        select = select.filter(Column::RequestType.eq(request_type));
    }
    if let Some(team_id) = q.team_id {
        select = select.filter(Column::TeamId.eq(team_id));
    }
    if let Some(assigned_to) = q.assigned_to {
        select = select.filter(Column::AssignedToUserId.eq(assigned_to));
    }
    if let Some(scheduled_date) = q.scheduled_date {
        select = select.filter(Column::ScheduledDate.eq(scheduled_date));
    }
    if let Some(equipment_id) = q.equipment_id {
        select = select.filter(Column::EquipmentId.eq(equipment_id));
    }
    if let Some(work_center_id) = q.work_center_id {
        select = select.filter(Column::WorkCenterId.eq(work_center_id));
    }

    let rows = select
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .into_model::<RequestRow>()
        .all(&state.db)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(Envelope::data(rows)))
}

pub async fn calendar(
    State(state): State<AppState>,
    Query(q): Query<CalendarQuery>,
) -> Result<Json<Envelope<Vec<CalendarRow>>>, ApiError> {
    use maintenance_request::Column;

    let mut select = joined_select().filter(Column::ScheduledDate.is_not_null());
    if let Some(start) = q.start_date {
        select = select.filter(Column::ScheduledDate.gte(start));
    }
    if let Some(end) = q.end_date {
        select = select.filter(Column::ScheduledDate.lte(end));
    }

    let rows = select
        .order_by_asc(Column::ScheduledDate)
        .order_by_asc(Column::Id)
        .into_model::<CalendarRow>()
        .all(&state.db)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(Envelope::data(rows)))
}

pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope<RequestDetail>>, ApiError> {
    let request = full_select()
        .expr_as(
            Expr::col((Alias::new("assignee"), user::Column::Email)),
            "assigned_to_email",
        )
        .expr_as(
            Expr::col((Alias::new("creator"), user::Column::Email)),
            "created_by_email",
        )
        .filter(maintenance_request::Column::Id.eq(id))
        .into_model::<RequestDetailRow>()
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Maintenance request not found"))?;

    let notes = note::Entity::find()
        .filter(note::Column::RequestId.eq(id))
        .order_by_desc(note::Column::CreatedAt)
        .order_by_desc(note::Column::Id)
        .all(&state.db)
        .await
        .map_err(ApiError::internal)?
        .into_iter()
        .map(NoteResponse::from)
        .collect();

    Ok(Json(Envelope::data(RequestDetail { request, notes })))
}

// ---------- lifecycle writes ----------

pub async fn create_request(
    State(state): State<AppState>,
    Json(body): Json<CreateRequestBody>,
) -> Result<(StatusCode, Json<Envelope<CreatedRequest>>), ApiError> {
    let target = RequestTarget::resolve(body.equipment_id, body.work_center_id);

    let (Some(raw_type), Some(subject), Some(created_by), Some(target)) = (
        body.r#type.filter(|s| !s.is_empty()),
        body.subject.filter(|s| !s.is_empty()),
        body.created_by_user_id,
        target,
    ) else {
        return Err(ApiError::validation(
            "Type, subject, creator, and exactly one of equipment or work center are required",
        ));
    };

    let request_type = RequestType::parse(&raw_type)
        .ok_or_else(|| ApiError::validation("Invalid type. Must be: corrective or preventive"))?;

    if request_type == RequestType::Preventive && body.scheduled_date.is_none() {
        return Err(ApiError::validation(
            "Scheduled date is required for preventive maintenance",
        ));
    }

    user::Entity::find_by_id(created_by)
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Creator user not found"))?;

    // Resolve the target and, for equipment, the implicit team. A team id
    // supplied by the caller always wins over the equipment's team.
    let (equipment_id, work_center_id, team_id, equipment_name, work_center_name) = match target {
        RequestTarget::Equipment(id) => {
            let equip = equipment::Entity::find_by_id(id)
                .one(&state.db)
                .await
                .map_err(ApiError::internal)?
                .ok_or_else(|| ApiError::not_found("Equipment not found"))?;
            let team_id = body.team_id.or(equip.maintenance_team_id);
            (Some(id), None, team_id, Some(equip.name), None)
        }
        RequestTarget::WorkCenter(id) => {
            let wc = work_center::Entity::find_by_id(id)
                .one(&state.db)
                .await
                .map_err(ApiError::internal)?
                .ok_or_else(|| ApiError::not_found("Work center not found"))?;
            (None, Some(id), body.team_id, None, Some(wc.name))
        }
    };

    let now = Utc::now().naive_utc();
    let model = maintenance_request::ActiveModel {
        request_type: Set(request_type.as_str().to_owned()),
        subject: Set(subject),
        equipment_id: Set(equipment_id),
        work_center_id: Set(work_center_id),
        team_id: Set(team_id),
        scheduled_date: Set(body.scheduled_date),
        status: Set(RequestStatus::New.as_str().to_owned()),
        created_by_user_id: Set(created_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(ApiError::internal)?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::message_with_data(
            "Maintenance request created successfully",
            CreatedRequest {
                id: model.id,
                team_id: model.team_id,
                equipment_name,
                work_center_name,
            },
        )),
    ))
}

pub async fn assign_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<AssignBody>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let user_id = body
        .user_id
        .ok_or_else(|| ApiError::validation("User id is required"))?;

    let request = maintenance_request::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Maintenance request not found"))?;

    let assignee = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let role = Role::parse(&assignee.role)
        .ok_or_else(|| ApiError::internal(format!("unrecognized stored role {:?}", assignee.role)))?;
    if !role.assignable() {
        return Err(ApiError::forbidden(
            "Only managers and technicians can be assigned to maintenance requests",
        ));
    }

    if let Some(team_id) = request.team_id
        && !role.bypasses_team_membership()
    {
        let member = team_member::Entity::find()
            .filter(team_member::Column::TeamId.eq(team_id))
            .filter(team_member::Column::UserId.eq(user_id))
            .one(&state.db)
            .await
            .map_err(ApiError::internal)?;
        if member.is_none() {
            return Err(ApiError::forbidden(
                "User is not a member of the team responsible for this request",
            ));
        }
    }

    let mut active: maintenance_request::ActiveModel = request.into();
    active.assigned_to_user_id = Set(Some(user_id));
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await.map_err(ApiError::internal)?;

    Ok(Json(Envelope::message("Request assigned successfully")))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let raw = body
        .status
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Status is required"))?;

    let to = RequestStatus::parse(&raw).ok_or_else(|| {
        ApiError::validation("Invalid status. Must be: new, in_progress, repaired, or scrap")
    })?;

    let request = maintenance_request::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Maintenance request not found"))?;

    let from = RequestStatus::parse(&request.status).ok_or_else(|| {
        ApiError::internal(format!("unrecognized stored status {:?}", request.status))
    })?;

    if !from.can_transition_to(to) {
        return Err(ApiError::validation(format!(
            "Cannot change status from {from} to {to}"
        )));
    }

    let mut active: maintenance_request::ActiveModel = request.into();
    active.status = Set(to.as_str().to_owned());
    if let Some(duration) = body.duration_hours {
        active.duration_hours = Set(Some(duration));
    }
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await.map_err(ApiError::internal)?;

    Ok(Json(Envelope::message("Status updated successfully")))
}

pub async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<NoteBody>,
) -> Result<(StatusCode, Json<Envelope<CreatedId>>), ApiError> {
    let message = body
        .message
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Note message is required"))?;

    maintenance_request::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Maintenance request not found"))?;

    let model = note::ActiveModel {
        request_id: Set(id),
        message: Set(message),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(ApiError::internal)?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::message_with_data(
            "Note added successfully",
            CreatedId { id: model.id },
        )),
    ))
}

pub async fn update_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateRequestBody>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let request = maintenance_request::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Maintenance request not found"))?;

    let current = RequestStatus::parse(&request.status).ok_or_else(|| {
        ApiError::internal(format!("unrecognized stored status {:?}", request.status))
    })?;
    if current.is_terminal() {
        return Err(ApiError::conflict("Cannot edit completed requests"));
    }

    if body.equipment_id.is_some() && body.work_center_id.is_some() {
        return Err(ApiError::validation(
            "Provide only one of equipment or work center",
        ));
    }

    let mut active: maintenance_request::ActiveModel = request.into();

    if let Some(raw_type) = body.r#type.filter(|s| !s.is_empty()) {
        let request_type = RequestType::parse(&raw_type).ok_or_else(|| {
            ApiError::validation("Invalid type. Must be: corrective or preventive")
        })?;
        active.request_type = Set(request_type.as_str().to_owned());
    }
    if let Some(subject) = body.subject.filter(|s| !s.is_empty()) {
        active.subject = Set(subject);
    }

    // Switching the target clears the other side; touching neither leaves the
    // stored target exactly as it was.
    if let Some(equipment_id) = body.equipment_id {
        let equip = equipment::Entity::find_by_id(equipment_id)
            .one(&state.db)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("Equipment not found"))?;
        active.equipment_id = Set(Some(equipment_id));
        active.work_center_id = Set(None);
        active.team_id = Set(equip.maintenance_team_id);
    } else if let Some(work_center_id) = body.work_center_id {
        work_center::Entity::find_by_id(work_center_id)
            .one(&state.db)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("Work center not found"))?;
        active.work_center_id = Set(Some(work_center_id));
        active.equipment_id = Set(None);
    }

    if let Some(scheduled_date) = body.scheduled_date {
        active.scheduled_date = Set(Some(scheduled_date));
    }
    if let Some(duration) = body.duration_hours {
        active.duration_hours = Set(Some(duration));
    }
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await.map_err(ApiError::internal)?;

    Ok(Json(Envelope::message(
        "Maintenance request updated successfully",
    )))
}

pub async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let request = maintenance_request::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Maintenance request not found"))?;

    // Deletion is never status-gated; notes go with the request.
    note::Entity::delete_many()
        .filter(note::Column::RequestId.eq(id))
        .exec(&state.db)
        .await
        .map_err(ApiError::internal)?;
    request.delete(&state.db).await.map_err(ApiError::internal)?;

    Ok(Json(Envelope::message(
        "Maintenance request deleted successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Auth;
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode},
        routing::{get, patch, post},
    };
    use chrono::{NaiveDate, NaiveDateTime};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn make_state(db: DatabaseConnection) -> AppState {
        AppState {
            auth: Arc::new(Auth::new(db.clone())),
            db,
            jwt_secret: "test-jwt-secret-key-32-chars-pad".to_string(),
            jwt_expiry_hours: 1,
        }
    }

    fn make_router(state: AppState) -> Router {
        Router::new()
            .route("/maintenance", get(list_requests).post(create_request))
            .route("/maintenance/calendar", get(calendar))
            .route(
                "/maintenance/{id}",
                get(get_request).put(update_request).delete(delete_request),
            )
            .route("/maintenance/{id}/assign", patch(assign_request))
            .route("/maintenance/{id}/status", patch(update_status))
            .route("/maintenance/{id}/notes", post(add_note))
            .with_state(state)
    }

    fn json_request(method: Method, uri: &str, value: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&value).unwrap()))
            .unwrap()
    }

    fn get_request_at(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    // ---- seed helpers ----

    async fn seed_user(db: &DatabaseConnection, name: &str, email: &str, role: &str) -> i32 {
        user::ActiveModel {
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set("x".to_owned()),
            role: Set(role.to_owned()),
            created_at: Set(ts(1, 0)),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    async fn seed_team(db: &DatabaseConnection, name: &str) -> i32 {
        team::ActiveModel {
            name: Set(name.to_owned()),
            created_at: Set(ts(1, 0)),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    async fn seed_member(db: &DatabaseConnection, team_id: i32, user_id: i32) {
        team_member::ActiveModel {
            team_id: Set(team_id),
            user_id: Set(user_id),
            created_at: Set(ts(1, 0)),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }

    async fn seed_equipment(
        db: &DatabaseConnection,
        name: &str,
        serial: &str,
        team_id: Option<i32>,
    ) -> i32 {
        equipment::ActiveModel {
            name: Set(name.to_owned()),
            serial_number: Set(serial.to_owned()),
            status: Set("active".to_owned()),
            maintenance_team_id: Set(team_id),
            created_at: Set(ts(1, 0)),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    async fn seed_work_center(db: &DatabaseConnection, name: &str) -> i32 {
        work_center::ActiveModel {
            name: Set(name.to_owned()),
            cost_per_hour: Set(0.0),
            capacity_per_hour: Set(0.0),
            time_efficiency_pct: Set(100.0),
            oee_target_pct: Set(85.0),
            status: Set("active".to_owned()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    /// Direct insert with an explicit created_at so ordering tests are
    /// deterministic.
    #[allow(clippy::too_many_arguments)]
    async fn seed_request(
        db: &DatabaseConnection,
        subject: &str,
        equipment_id: Option<i32>,
        work_center_id: Option<i32>,
        team_id: Option<i32>,
        status: &str,
        scheduled_date: Option<NaiveDate>,
        created_by: i32,
        created_at: NaiveDateTime,
    ) -> i32 {
        maintenance_request::ActiveModel {
            request_type: Set("corrective".to_owned()),
            subject: Set(subject.to_owned()),
            equipment_id: Set(equipment_id),
            work_center_id: Set(work_center_id),
            team_id: Set(team_id),
            scheduled_date: Set(scheduled_date),
            status: Set(status.to_owned()),
            created_by_user_id: Set(created_by),
            created_at: Set(created_at),
            updated_at: Set(created_at),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    async fn fetch(db: &DatabaseConnection, id: i32) -> maintenance_request::Model {
        maintenance_request::Entity::find_by_id(id)
            .one(db)
            .await
            .unwrap()
            .unwrap()
    }

    // ---- create ----

    #[tokio::test]
    async fn create_requires_exactly_one_target() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let wc = seed_work_center(&db, "Cell A").await;
        let router = make_router(make_state(db));

        for payload in [
            serde_json::json!({
                "type": "corrective", "subject": "Leak",
                "equipment_id": equip, "work_center_id": wc,
                "created_by_user_id": creator,
            }),
            serde_json::json!({
                "type": "corrective", "subject": "Leak",
                "created_by_user_id": creator,
            }),
        ] {
            let res = router
                .clone()
                .oneshot(json_request(Method::POST, "/maintenance", payload))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn preventive_requires_scheduled_date() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let router = make_router(make_state(db));

        let res = router
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/maintenance",
                serde_json::json!({
                    "type": "preventive", "subject": "Inspection",
                    "equipment_id": equip, "created_by_user_id": creator,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = router
            .oneshot(json_request(
                Method::POST,
                "/maintenance",
                serde_json::json!({
                    "type": "preventive", "subject": "Inspection",
                    "equipment_id": equip, "created_by_user_id": creator,
                    "scheduled_date": "2026-02-01",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn create_resolves_team_from_equipment() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let team_id = seed_team(&db, "Mechanics").await;
        let equip = seed_equipment(&db, "Press", "SN-1", Some(team_id)).await;
        let state = make_state(db);

        let res = make_router(state.clone())
            .oneshot(json_request(
                Method::POST,
                "/maintenance",
                serde_json::json!({
                    "type": "corrective", "subject": "Leak",
                    "equipment_id": equip, "created_by_user_id": creator,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let v = body_json(res).await;
        assert_eq!(v["data"]["team_id"], team_id);
        assert_eq!(v["data"]["equipment_name"], "Press");

        let stored = fetch(&state.db, v["data"]["id"].as_i64().unwrap() as i32).await;
        assert_eq!(stored.team_id, Some(team_id));
        assert_eq!(stored.status, "new");
    }

    #[tokio::test]
    async fn create_explicit_team_wins() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip_team = seed_team(&db, "Mechanics").await;
        let other_team = seed_team(&db, "Electricians").await;
        let equip = seed_equipment(&db, "Press", "SN-1", Some(equip_team)).await;
        let state = make_state(db);

        let res = make_router(state.clone())
            .oneshot(json_request(
                Method::POST,
                "/maintenance",
                serde_json::json!({
                    "type": "corrective", "subject": "Leak",
                    "equipment_id": equip, "team_id": other_team,
                    "created_by_user_id": creator,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let v = body_json(res).await;
        assert_eq!(v["data"]["team_id"], other_team);
    }

    #[tokio::test]
    async fn create_unknown_references_not_found() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let router = make_router(make_state(db));

        let res = router
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/maintenance",
                serde_json::json!({
                    "type": "corrective", "subject": "Leak",
                    "equipment_id": 9999, "created_by_user_id": creator,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = router
            .oneshot(json_request(
                Method::POST,
                "/maintenance",
                serde_json::json!({
                    "type": "corrective", "subject": "Leak",
                    "equipment_id": equip, "created_by_user_id": 9999,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_rejects_unknown_type() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let router = make_router(make_state(db));

        let res = router
            .oneshot(json_request(
                Method::POST,
                "/maintenance",
                serde_json::json!({
                    "type": "predictive", "subject": "Leak",
                    "equipment_id": equip, "created_by_user_id": creator,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    // ---- status transitions ----

    #[tokio::test]
    async fn status_scrap_is_terminal() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let id = seed_request(
            &db, "Leak", Some(equip), None, None, "new", None, creator, ts(2, 9),
        )
        .await;
        let router = make_router(make_state(db));

        let res = router
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                &format!("/maintenance/{id}/status"),
                serde_json::json!({"status": "scrap"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = router
            .oneshot(json_request(
                Method::PATCH,
                &format!("/maintenance/{id}/status"),
                serde_json::json!({"status": "in_progress"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let v = body_json(res).await;
        let msg = v["message"].as_str().unwrap();
        assert!(msg.contains("scrap") && msg.contains("in_progress"), "{msg}");
    }

    #[tokio::test]
    async fn status_rejects_backward_and_self_transitions() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let in_progress = seed_request(
            &db, "A", Some(equip), None, None, "in_progress", None, creator, ts(2, 9),
        )
        .await;
        let fresh = seed_request(
            &db, "B", Some(equip), None, None, "new", None, creator, ts(2, 10),
        )
        .await;
        let router = make_router(make_state(db));

        for (id, to) in [(in_progress, "new"), (fresh, "new"), (fresh, "repaired")] {
            let res = router
                .clone()
                .oneshot(json_request(
                    Method::PATCH,
                    &format!("/maintenance/{id}/status"),
                    serde_json::json!({"status": to}),
                ))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "-> {to}");
        }
    }

    #[tokio::test]
    async fn status_rejects_unknown_value() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let id = seed_request(
            &db, "Leak", Some(equip), None, None, "new", None, creator, ts(2, 9),
        )
        .await;
        let router = make_router(make_state(db));

        let res = router
            .oneshot(json_request(
                Method::PATCH,
                &format!("/maintenance/{id}/status"),
                serde_json::json!({"status": "done"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn status_preserves_duration_unless_supplied() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let id = seed_request(
            &db, "Leak", Some(equip), None, None, "new", None, creator, ts(2, 9),
        )
        .await;
        let state = make_state(db);
        let router = make_router(state.clone());

        let res = router
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                &format!("/maintenance/{id}/status"),
                serde_json::json!({"status": "in_progress", "duration_hours": 2.5}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(fetch(&state.db, id).await.duration_hours, Some(2.5));

        let res = router
            .oneshot(json_request(
                Method::PATCH,
                &format!("/maintenance/{id}/status"),
                serde_json::json!({"status": "repaired"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let stored = fetch(&state.db, id).await;
        assert_eq!(stored.status, "repaired");
        assert_eq!(stored.duration_hours, Some(2.5));
    }

    // ---- assign ----

    #[tokio::test]
    async fn assign_enforces_roles_and_membership() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let team_id = seed_team(&db, "Mechanics").await;
        let equip = seed_equipment(&db, "Press", "SN-1", Some(team_id)).await;
        let id = seed_request(
            &db,
            "Leak",
            Some(equip),
            None,
            Some(team_id),
            "new",
            None,
            creator,
            ts(2, 9),
        )
        .await;

        let plain = seed_user(&db, "Bob", "bob@example.com", "user").await;
        let outsider = seed_user(&db, "Cal", "cal@example.com", "technician").await;
        let insider = seed_user(&db, "Dee", "dee@example.com", "technician").await;
        seed_member(&db, team_id, insider).await;
        let manager = seed_user(&db, "Eve", "eve@example.com", "manager").await;

        let state = make_state(db);
        let router = make_router(state.clone());
        let assign = |user_id: i32| {
            json_request(
                Method::PATCH,
                &format!("/maintenance/{id}/assign"),
                serde_json::json!({"user_id": user_id}),
            )
        };

        let res = router.clone().oneshot(assign(plain)).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = router.clone().oneshot(assign(outsider)).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = router.clone().oneshot(assign(insider)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(fetch(&state.db, id).await.assigned_to_user_id, Some(insider));

        // Managers bypass the membership check entirely.
        let res = router.oneshot(assign(manager)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(fetch(&state.db, id).await.assigned_to_user_id, Some(manager));
    }

    #[tokio::test]
    async fn assign_teamless_request_accepts_any_technician() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let tech = seed_user(&db, "Cal", "cal@example.com", "technician").await;
        let wc = seed_work_center(&db, "Cell A").await;
        let id = seed_request(
            &db, "Jam", None, Some(wc), None, "new", None, creator, ts(2, 9),
        )
        .await;
        let router = make_router(make_state(db));

        let res = router
            .oneshot(json_request(
                Method::PATCH,
                &format!("/maintenance/{id}/assign"),
                serde_json::json!({"user_id": tech}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn assign_missing_request_or_user_not_found() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let id = seed_request(
            &db, "Leak", Some(equip), None, None, "new", None, creator, ts(2, 9),
        )
        .await;
        let router = make_router(make_state(db));

        let res = router
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                "/maintenance/9999/assign",
                serde_json::json!({"user_id": creator}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = router
            .oneshot(json_request(
                Method::PATCH,
                &format!("/maintenance/{id}/assign"),
                serde_json::json!({"user_id": 9999}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    // ---- update ----

    #[tokio::test]
    async fn update_completed_request_conflicts() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let repaired = seed_request(
            &db, "A", Some(equip), None, None, "repaired", None, creator, ts(2, 9),
        )
        .await;
        let scrapped = seed_request(
            &db, "B", Some(equip), None, None, "scrap", None, creator, ts(2, 10),
        )
        .await;
        let router = make_router(make_state(db));

        for id in [repaired, scrapped] {
            let res = router
                .clone()
                .oneshot(json_request(
                    Method::PUT,
                    &format!("/maintenance/{id}"),
                    serde_json::json!({"subject": "New subject"}),
                ))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::CONFLICT);
        }
    }

    #[tokio::test]
    async fn update_switches_target_and_clears_other_side() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let team_id = seed_team(&db, "Mechanics").await;
        let equip = seed_equipment(&db, "Press", "SN-1", Some(team_id)).await;
        let wc = seed_work_center(&db, "Cell A").await;
        let id = seed_request(
            &db, "Leak", Some(equip), None, Some(team_id), "new", None, creator, ts(2, 9),
        )
        .await;
        let state = make_state(db);
        let router = make_router(state.clone());

        let res = router
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &format!("/maintenance/{id}"),
                serde_json::json!({"work_center_id": wc}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let stored = fetch(&state.db, id).await;
        assert_eq!(stored.work_center_id, Some(wc));
        assert_eq!(stored.equipment_id, None);

        let res = router
            .oneshot(json_request(
                Method::PUT,
                &format!("/maintenance/{id}"),
                serde_json::json!({"equipment_id": equip}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let stored = fetch(&state.db, id).await;
        assert_eq!(stored.equipment_id, Some(equip));
        assert_eq!(stored.work_center_id, None);
        assert_eq!(stored.team_id, Some(team_id));
    }

    #[tokio::test]
    async fn update_without_target_preserves_stored_target() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let id = seed_request(
            &db, "Leak", Some(equip), None, None, "new", None, creator, ts(2, 9),
        )
        .await;
        let state = make_state(db);

        let res = make_router(state.clone())
            .oneshot(json_request(
                Method::PUT,
                &format!("/maintenance/{id}"),
                serde_json::json!({"subject": "Bigger leak", "duration_hours": 1.0}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let stored = fetch(&state.db, id).await;
        assert_eq!(stored.subject, "Bigger leak");
        assert_eq!(stored.equipment_id, Some(equip));
        assert_eq!(stored.duration_hours, Some(1.0));
    }

    #[tokio::test]
    async fn update_rejects_both_targets() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let wc = seed_work_center(&db, "Cell A").await;
        let id = seed_request(
            &db, "Leak", Some(equip), None, None, "new", None, creator, ts(2, 9),
        )
        .await;
        let router = make_router(make_state(db));

        let res = router
            .oneshot(json_request(
                Method::PUT,
                &format!("/maintenance/{id}"),
                serde_json::json!({"equipment_id": equip, "work_center_id": wc}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    // ---- notes and delete ----

    #[tokio::test]
    async fn notes_append_and_list_newest_first() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let id = seed_request(
            &db, "Leak", Some(equip), None, None, "new", None, creator, ts(2, 9),
        )
        .await;
        let router = make_router(make_state(db));

        for msg in ["first", "second"] {
            let res = router
                .clone()
                .oneshot(json_request(
                    Method::POST,
                    &format!("/maintenance/{id}/notes"),
                    serde_json::json!({"message": msg}),
                ))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::CREATED);
        }

        let res = router
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/maintenance/{id}/notes"),
                serde_json::json!({"message": ""}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = router
            .oneshot(get_request_at(&format!("/maintenance/{id}")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let v = body_json(res).await;
        let notes = v["data"]["notes"].as_array().unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0]["message"], "second");
        assert_eq!(notes[1]["message"], "first");
    }

    #[tokio::test]
    async fn delete_removes_request_and_notes() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        // Scrapped requests can still be deleted; only edits are gated.
        let id = seed_request(
            &db, "Leak", Some(equip), None, None, "scrap", None, creator, ts(2, 9),
        )
        .await;
        let state = make_state(db);
        let router = make_router(state.clone());

        router
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/maintenance/{id}/notes"),
                serde_json::json!({"message": "a note"}),
            ))
            .await
            .unwrap();

        let res = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/maintenance/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        assert!(
            maintenance_request::Entity::find_by_id(id)
                .one(&state.db)
                .await
                .unwrap()
                .is_none()
        );
        let orphans = note::Entity::find()
            .filter(note::Column::RequestId.eq(id))
            .all(&state.db)
            .await
            .unwrap();
        assert!(orphans.is_empty());

        let res = router
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/maintenance/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    // ---- reads ----

    #[tokio::test]
    async fn list_orders_newest_first_and_filters() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let team_id = seed_team(&db, "Mechanics").await;
        let equip = seed_equipment(&db, "Press", "SN-1", Some(team_id)).await;
        let wc = seed_work_center(&db, "Cell A").await;
        seed_request(
            &db, "Oldest", Some(equip), None, Some(team_id), "new", None, creator, ts(2, 9),
        )
        .await;
        seed_request(
            &db, "Middle", None, Some(wc), None, "in_progress", None, creator, ts(3, 9),
        )
        .await;
        seed_request(
            &db, "Newest", Some(equip), None, Some(team_id), "new", None, creator, ts(4, 9),
        )
        .await;
        let router = make_router(make_state(db));

        let res = router
            .clone()
            .oneshot(get_request_at("/maintenance"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let v = body_json(res).await;
        let rows = v["data"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["subject"], "Newest");
        assert_eq!(rows[2]["subject"], "Oldest");
        assert_eq!(rows[0]["equipment_name"], "Press");
        assert_eq!(rows[0]["team_name"], "Mechanics");
        assert_eq!(rows[0]["created_by_name"], "Ann");
        assert_eq!(rows[1]["work_center_name"], "Cell A");

        let res = router
            .clone()
            .oneshot(get_request_at("/maintenance?status=new"))
            .await
            .unwrap();
        let v = body_json(res).await;
        let rows = v["data"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r["status"] == "new"));

        let res = router
            .oneshot(get_request_at(&format!(
                "/maintenance?status=new&team_id={team_id}&type=corrective"
            )))
            .await
            .unwrap();
        let v = body_json(res).await;
        assert_eq!(v["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn calendar_bounds_and_orders_by_date() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let equip = seed_equipment(&db, "Press", "SN-1", None).await;
        let date = |d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();
        seed_request(
            &db, "Unscheduled", Some(equip), None, None, "new", None, creator, ts(2, 9),
        )
        .await;
        seed_request(
            &db, "Late", Some(equip), None, None, "new", Some(date(20)), creator, ts(2, 10),
        )
        .await;
        seed_request(
            &db, "Early", Some(equip), None, None, "new", Some(date(5)), creator, ts(2, 11),
        )
        .await;
        let router = make_router(make_state(db));

        let res = router
            .clone()
            .oneshot(get_request_at("/maintenance/calendar"))
            .await
            .unwrap();
        let v = body_json(res).await;
        let rows = v["data"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["subject"], "Early");
        assert_eq!(rows[1]["subject"], "Late");

        // Bounds are inclusive on both sides.
        let res = router
            .oneshot(get_request_at(
                "/maintenance/calendar?start_date=2026-03-06&end_date=2026-03-20",
            ))
            .await
            .unwrap();
        let v = body_json(res).await;
        let rows = v["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["subject"], "Late");
    }

    #[tokio::test]
    async fn get_request_resolves_names() {
        let db = setup_db().await;
        let creator = seed_user(&db, "Ann", "ann@example.com", "user").await;
        let tech = seed_user(&db, "Cal", "cal@example.com", "technician").await;
        let team_id = seed_team(&db, "Mechanics").await;
        let equip = seed_equipment(&db, "Press", "SN-1", Some(team_id)).await;
        let id = seed_request(
            &db, "Leak", Some(equip), None, Some(team_id), "new", None, creator, ts(2, 9),
        )
        .await;
        let state = make_state(db);
        let router = make_router(state.clone());

        router
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                &format!("/maintenance/{id}/assign"),
                serde_json::json!({"user_id": tech}),
            ))
            .await
            .unwrap();

        let res = router
            .clone()
            .oneshot(get_request_at(&format!("/maintenance/{id}")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let v = body_json(res).await;
        assert_eq!(v["data"]["type"], "corrective");
        assert_eq!(v["data"]["equipment_name"], "Press");
        assert_eq!(v["data"]["serial_number"], "SN-1");
        assert_eq!(v["data"]["team_name"], "Mechanics");
        assert_eq!(v["data"]["assigned_to_name"], "Cal");
        assert_eq!(v["data"]["assigned_to_email"], "cal@example.com");
        assert_eq!(v["data"]["created_by_name"], "Ann");

        let res = router
            .oneshot(get_request_at("/maintenance/9999"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
