//! Support ticket handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use otp_wallet_core::{SupportTicket, TicketId, TicketStatus};
use otp_wallet_store::Store;

use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Support ticket response.
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    /// Ticket ID.
    pub id: String,
    /// Owning user ID.
    pub user_id: String,
    /// Subject line.
    pub subject: String,
    /// The user's message.
    pub message: String,
    /// `open` or `closed`.
    pub status: String,
    /// Admin response.
    pub response: Option<String>,
    /// Responding admin.
    pub responded_by: Option<String>,
    /// Response time.
    pub responded_at: Option<String>,
    /// Creation time.
    pub created_at: String,
}

impl From<&SupportTicket> for TicketResponse {
    fn from(ticket: &SupportTicket) -> Self {
        Self {
            id: ticket.id.to_string(),
            user_id: ticket.user_id.to_string(),
            subject: ticket.subject.clone(),
            message: ticket.message.clone(),
            status: ticket.status.as_str().to_string(),
            response: ticket.response.clone(),
            responded_by: ticket.responded_by.map(|id| id.to_string()),
            responded_at: ticket.responded_at.map(|at| at.to_rfc3339()),
            created_at: ticket.created_at.to_rfc3339(),
        }
    }
}

fn to_responses(tickets: &[SupportTicket]) -> Vec<TicketResponse> {
    tickets.iter().map(TicketResponse::from).collect()
}

/// New ticket request.
#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    /// Subject line.
    pub subject: String,
    /// Message (at least 10 characters).
    pub message: String,
}

/// Open a support ticket.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let ticket = SupportTicket::open(auth.user.id, &request.subject, &request.message)?;
    state.store.put_ticket(&ticket)?;

    tracing::info!(ticket_id = %ticket.id, user_id = %auth.user.id, "Support ticket opened");

    Ok((StatusCode::CREATED, Json(TicketResponse::from(&ticket))))
}

/// List the current user's tickets.
pub async fn list_own(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<TicketResponse>>, ApiError> {
    let tickets = state.store.list_tickets_by_user(&auth.user.id)?;
    Ok(Json(to_responses(&tickets)))
}

/// List all tickets.
pub async fn list_all(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<TicketResponse>>, ApiError> {
    let tickets = state.store.list_tickets(None)?;
    Ok(Json(to_responses(&tickets)))
}

/// List open tickets.
pub async fn list_open(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<TicketResponse>>, ApiError> {
    let tickets = state.store.list_tickets(Some(TicketStatus::Open))?;
    Ok(Json(to_responses(&tickets)))
}

/// Admin response request.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    /// Response text; must not be blank.
    pub response: String,
}

/// Answer a ticket and close it.
pub async fn respond(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(ticket_id): Path<String>,
    ApiJson(body): ApiJson<RespondRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket_id: TicketId = ticket_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid ticket id: {ticket_id}")))?;

    let ticket = state
        .store
        .respond_to_ticket(&ticket_id, &admin.user().id, &body.response)?;

    tracing::info!(ticket_id = %ticket.id, admin_id = %admin.user().id, "Support ticket closed");

    Ok(Json(TicketResponse::from(&ticket)))
}
