//! Work-center CRUD and the alternative-work-center links.
//!
//! Deleting a work center is a soft deactivate; the hard-delete path only
//! exists for the alternative links.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entity::{work_center, work_center_alternative};

use super::{
    ApiError, AppState,
    dto::{
        AddAlternativeBody, AlternativeRow, CreateWorkCenterBody, CreatedId, Envelope,
        ListWorkCentersQuery, UpdateWorkCenterBody, WorkCenterDetail, WorkCenterResponse,
    },
};

/// Unique-constraint violations surface as conflicts, everything else is a
/// storage failure.
fn map_unique(e: DbErr, conflict_msg: &'static str) -> ApiError {
    if e.to_string().contains("UNIQUE") {
        ApiError::conflict(conflict_msg)
    } else {
        ApiError::internal(e)
    }
}

fn check_bounds(
    cost: Option<f64>,
    capacity: Option<f64>,
    efficiency: Option<f64>,
    oee: Option<f64>,
    status: Option<&str>,
) -> Result<(), ApiError> {
    if cost.is_some_and(|v| v < 0.0) || capacity.is_some_and(|v| v < 0.0) {
        return Err(ApiError::validation(
            "Cost per hour and capacity per hour must be zero or greater",
        ));
    }
    if efficiency.is_some_and(|v| !(0.0..=100.0).contains(&v))
        || oee.is_some_and(|v| !(0.0..=100.0).contains(&v))
    {
        return Err(ApiError::validation(
            "Time efficiency and OEE target must be between 0 and 100",
        ));
    }
    if let Some(s) = status
        && s != "active"
        && s != "inactive"
    {
        return Err(ApiError::validation("Status must be active or inactive"));
    }
    Ok(())
}

async fn find_work_center(state: &AppState, id: i32) -> Result<work_center::Model, ApiError> {
    work_center::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Work center not found"))
}

fn alternatives_select(id: i32) -> sea_orm::Select<work_center_alternative::Entity> {
    use work_center_alternative::Column;

    work_center_alternative::Entity::find()
        .select_only()
        .column(Column::Id)
        .column_as(Column::AlternativeWorkCenterId, "alt_id")
        .expr_as(
            Expr::col((Alias::new("alt"), work_center::Column::Name)),
            "alt_name",
        )
        .join_as(
            JoinType::InnerJoin,
            work_center_alternative::Relation::AlternativeWorkCenter.def(),
            Alias::new("alt"),
        )
        .filter(Column::WorkCenterId.eq(id))
        .order_by_asc(Column::Id)
}

// ---------- work centers ----------

pub async fn list_work_centers(
    State(state): State<AppState>,
    Query(q): Query<ListWorkCentersQuery>,
) -> Result<Json<Envelope<Vec<WorkCenterResponse>>>, ApiError> {
    use work_center::Column;

    let mut select = work_center::Entity::find();
    if let Some(status) = q.status.filter(|s| !s.is_empty()) {
        select = select.filter(Column::Status.eq(status));
    }
    if let Some(search) = q.search.filter(|s| !s.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(Column::Name.contains(&search))
                .add(Column::Code.contains(&search)),
        );
    }

    let rows = select
        .order_by_asc(Column::Name)
        .all(&state.db)
        .await
        .map_err(ApiError::internal)?
        .into_iter()
        .map(WorkCenterResponse::from)
        .collect();

    Ok(Json(Envelope::data(rows)))
}

pub async fn create_work_center(
    State(state): State<AppState>,
    Json(body): Json<CreateWorkCenterBody>,
) -> Result<(StatusCode, Json<Envelope<WorkCenterResponse>>), ApiError> {
    let name = body
        .name
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Work center name is required"))?;

    check_bounds(
        body.cost_per_hour,
        body.capacity_per_hour,
        body.time_efficiency_pct,
        body.oee_target_pct,
        body.status.as_deref(),
    )?;

    let model = work_center::ActiveModel {
        name: Set(name),
        code: Set(body.code.filter(|s| !s.is_empty())),
        tag: Set(body.tag.filter(|s| !s.is_empty())),
        cost_per_hour: Set(body.cost_per_hour.unwrap_or(0.0)),
        capacity_per_hour: Set(body.capacity_per_hour.unwrap_or(0.0)),
        time_efficiency_pct: Set(body.time_efficiency_pct.unwrap_or(100.0)),
        oee_target_pct: Set(body.oee_target_pct.unwrap_or(0.0)),
        status: Set(body.status.unwrap_or_else(|| "active".to_owned())),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| map_unique(e, "Work center with this name or code already exists"))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::message_with_data(
            "Work center created successfully",
            WorkCenterResponse::from(model),
        )),
    ))
}

pub async fn get_work_center(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope<WorkCenterDetail>>, ApiError> {
    let found = find_work_center(&state, id).await?;

    let alternatives = alternatives_select(id)
        .into_model::<AlternativeRow>()
        .all(&state.db)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(Envelope::data(WorkCenterDetail {
        work_center: WorkCenterResponse::from(found),
        alternatives,
    })))
}

pub async fn update_work_center(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateWorkCenterBody>,
) -> Result<Json<Envelope<WorkCenterResponse>>, ApiError> {
    let found = find_work_center(&state, id).await?;

    check_bounds(
        body.cost_per_hour,
        body.capacity_per_hour,
        body.time_efficiency_pct,
        body.oee_target_pct,
        body.status.as_deref(),
    )?;

    let mut active: work_center::ActiveModel = found.into();
    if let Some(name) = body.name.filter(|s| !s.trim().is_empty()) {
        active.name = Set(name);
    }
    if let Some(code) = body.code {
        active.code = Set(Some(code).filter(|s| !s.is_empty()));
    }
    if let Some(tag) = body.tag {
        active.tag = Set(Some(tag).filter(|s| !s.is_empty()));
    }
    if let Some(v) = body.cost_per_hour {
        active.cost_per_hour = Set(v);
    }
    if let Some(v) = body.capacity_per_hour {
        active.capacity_per_hour = Set(v);
    }
    if let Some(v) = body.time_efficiency_pct {
        active.time_efficiency_pct = Set(v);
    }
    if let Some(v) = body.oee_target_pct {
        active.oee_target_pct = Set(v);
    }
    if let Some(status) = body.status {
        active.status = Set(status);
    }

    let model = active
        .update(&state.db)
        .await
        .map_err(|e| map_unique(e, "Work center with this name or code already exists"))?;

    Ok(Json(Envelope::message_with_data(
        "Work center updated successfully",
        WorkCenterResponse::from(model),
    )))
}

pub async fn deactivate_work_center(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let found = find_work_center(&state, id).await?;

    let mut active: work_center::ActiveModel = found.into();
    active.status = Set("inactive".to_owned());
    active.update(&state.db).await.map_err(ApiError::internal)?;

    Ok(Json(Envelope::message("Work center deactivated")))
}

// ---------- alternatives ----------

pub async fn list_alternatives(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope<Vec<AlternativeRow>>>, ApiError> {
    find_work_center(&state, id).await?;

    let rows = alternatives_select(id)
        .into_model::<AlternativeRow>()
        .all(&state.db)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(Envelope::data(rows)))
}

pub async fn add_alternative(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<AddAlternativeBody>,
) -> Result<(StatusCode, Json<Envelope<CreatedId>>), ApiError> {
    let alt_id = body
        .alternative_work_center_id
        .ok_or_else(|| ApiError::validation("Alternative work center id is required"))?;

    if alt_id == id {
        return Err(ApiError::validation(
            "A work center cannot be its own alternative",
        ));
    }

    find_work_center(&state, id).await?;
    find_work_center(&state, alt_id).await?;

    let model = work_center_alternative::ActiveModel {
        work_center_id: Set(id),
        alternative_work_center_id: Set(alt_id),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| map_unique(e, "Alternative already linked"))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::message_with_data(
            "Alternative added successfully",
            CreatedId { id: model.id },
        )),
    ))
}

pub async fn remove_alternative(
    State(state): State<AppState>,
    Path((id, alt_id)): Path<(i32, i32)>,
) -> Result<Json<Envelope<()>>, ApiError> {
    use work_center_alternative::Column;

    let deleted = work_center_alternative::Entity::delete_many()
        .filter(Column::WorkCenterId.eq(id))
        .filter(Column::AlternativeWorkCenterId.eq(alt_id))
        .exec(&state.db)
        .await
        .map_err(ApiError::internal)?;

    if deleted.rows_affected == 0 {
        return Err(ApiError::not_found("Alternative link not found"));
    }

    Ok(Json(Envelope::message("Alternative removed")))
}
