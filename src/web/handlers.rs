// HTTP handlers - thin wrappers that extract, call the gateway, serialize.

use super::api_error::{ApiError, ApiJson, ApiPath};
use super::auth_middleware::Viewer;
use super::dto::{CommentRequest, PostRequest, RegisterUserRequest, ReportRequest, SendMessageRequest};
use super::AppState;
use crate::core::social::{
    Comment, CommentId, Message, Notification, NotificationId, Post, PostId, RecordStore, Report,
    ToggleState, User, UserId,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;

type ApiResult<T> = Result<T, ApiError>;

pub async fn register_user<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    WithRejection(Json(body), _): ApiJson<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.gateway.register_user(&body.name, body.age).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// ----------------------------------------------------------------------------
// Posts
// ----------------------------------------------------------------------------

pub async fn create_post<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Json(body), _): ApiJson<PostRequest>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let actor = viewer.require()?;
    let post = state
        .gateway
        .create_post(actor, &body.content, body.image_url)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_feed<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.gateway.list_feed(viewer.0).await?))
}

pub async fn get_post<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(post_id), _): ApiPath<PostId>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.gateway.get_post(viewer.0, post_id).await?))
}

pub async fn edit_post<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(post_id), _): ApiPath<PostId>,
    WithRejection(Json(body), _): ApiJson<PostRequest>,
) -> ApiResult<Json<Post>> {
    let actor = viewer.require()?;
    let post = state
        .gateway
        .edit_post(actor, post_id, &body.content, body.image_url)
        .await?;
    Ok(Json(post))
}

pub async fn delete_post<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(post_id), _): ApiPath<PostId>,
) -> ApiResult<StatusCode> {
    let actor = viewer.require()?;
    state.gateway.delete_post(actor, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_post_like<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(post_id), _): ApiPath<PostId>,
) -> ApiResult<Json<ToggleState>> {
    let actor = viewer.require()?;
    Ok(Json(state.gateway.toggle_post_like(actor, post_id).await?))
}

pub async fn report_post<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(post_id), _): ApiPath<PostId>,
    WithRejection(Json(body), _): ApiJson<ReportRequest>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    let actor = viewer.require()?;
    let report = state
        .gateway
        .report_post(actor, post_id, &body.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

// ----------------------------------------------------------------------------
// Comments
// ----------------------------------------------------------------------------

pub async fn list_comments<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(post_id), _): ApiPath<PostId>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.gateway.list_comments(viewer.0, post_id).await?))
}

pub async fn create_comment<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(post_id), _): ApiPath<PostId>,
    WithRejection(Json(body), _): ApiJson<CommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let actor = viewer.require()?;
    let comment = state
        .gateway
        .create_comment(actor, post_id, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn edit_comment<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(comment_id), _): ApiPath<CommentId>,
    WithRejection(Json(body), _): ApiJson<CommentRequest>,
) -> ApiResult<Json<Comment>> {
    let actor = viewer.require()?;
    let comment = state
        .gateway
        .edit_comment(actor, comment_id, &body.content)
        .await?;
    Ok(Json(comment))
}

pub async fn delete_comment<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(comment_id), _): ApiPath<CommentId>,
) -> ApiResult<StatusCode> {
    let actor = viewer.require()?;
    state.gateway.delete_comment(actor, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_comment_like<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(comment_id), _): ApiPath<CommentId>,
) -> ApiResult<Json<ToggleState>> {
    let actor = viewer.require()?;
    Ok(Json(
        state.gateway.toggle_comment_like(actor, comment_id).await?,
    ))
}

// ----------------------------------------------------------------------------
// Follows and messages
// ----------------------------------------------------------------------------

pub async fn toggle_follow<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(target), _): ApiPath<UserId>,
) -> ApiResult<Json<ToggleState>> {
    let actor = viewer.require()?;
    Ok(Json(state.gateway.toggle_follow(actor, target).await?))
}

pub async fn send_message<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Json(body), _): ApiJson<SendMessageRequest>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let actor = viewer.require()?;
    let message = state
        .gateway
        .send_message(actor, body.receiver_id, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_conversation<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(other), _): ApiPath<UserId>,
) -> ApiResult<Json<Vec<Message>>> {
    let actor = viewer.require()?;
    Ok(Json(state.gateway.list_conversation(actor, other).await?))
}

// ----------------------------------------------------------------------------
// Notifications
// ----------------------------------------------------------------------------

pub async fn list_notifications<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
) -> ApiResult<Json<Vec<Notification>>> {
    let actor = viewer.require()?;
    Ok(Json(state.gateway.list_notifications(actor).await?))
}

pub async fn mark_notification_read<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(viewer): Extension<Viewer>,
    WithRejection(Path(notification_id), _): ApiPath<NotificationId>,
) -> ApiResult<StatusCode> {
    let actor = viewer.require()?;
    state
        .gateway
        .mark_notification_read(actor, notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
