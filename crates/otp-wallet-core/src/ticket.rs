//! Support tickets.
//!
//! A ticket is a single message answered by a single admin response:
//! `open --respond--> closed`. There is no reopening or threading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};
use crate::{TicketId, UserId};

/// Minimum message length.
pub const MIN_TICKET_MESSAGE_LEN: usize = 10;

/// A support ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTicket {
    /// Ticket ID.
    pub id: TicketId,

    /// Author.
    pub user_id: UserId,

    /// Subject line.
    pub subject: String,

    /// Free-text message.
    pub message: String,

    /// Open or closed.
    pub status: TicketStatus,

    /// Admin response.
    pub response: Option<String>,

    /// Admin who responded.
    pub responded_by: Option<UserId>,

    /// When the admin responded.
    pub responded_at: Option<DateTime<Utc>>,

    /// When the ticket was created.
    pub created_at: DateTime<Utc>,
}

impl SupportTicket {
    /// Open a new ticket.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::InvalidInput` for a blank subject or a message
    /// shorter than [`MIN_TICKET_MESSAGE_LEN`] characters.
    pub fn open(user_id: UserId, subject: &str, message: &str) -> Result<Self> {
        if subject.trim().is_empty() {
            return Err(WalletError::InvalidInput("Subject is required".into()));
        }
        if message.trim().chars().count() < MIN_TICKET_MESSAGE_LEN {
            return Err(WalletError::InvalidInput(format!(
                "Message must be at least {MIN_TICKET_MESSAGE_LEN} characters"
            )));
        }

        Ok(Self {
            id: TicketId::generate(),
            user_id,
            subject: subject.trim().to_string(),
            message: message.to_string(),
            status: TicketStatus::Open,
            response: None,
            responded_by: None,
            responded_at: None,
            created_at: Utc::now(),
        })
    }

    /// Answer the ticket and close it.
    ///
    /// # Errors
    ///
    /// - `WalletError::InvalidInput` for a blank response.
    /// - `WalletError::InvalidState` if the ticket is already closed.
    pub fn respond(&mut self, admin_id: UserId, response: &str) -> Result<()> {
        if response.trim().is_empty() {
            return Err(WalletError::InvalidInput("Response is required".into()));
        }
        if self.status == TicketStatus::Closed {
            return Err(WalletError::InvalidState(format!(
                "Support ticket {} is already closed",
                self.id
            )));
        }
        self.status = TicketStatus::Closed;
        self.response = Some(response.to_string());
        self.responded_by = Some(admin_id);
        self.responded_at = Some(Utc::now());
        Ok(())
    }
}

/// Ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Awaiting a response.
    Open,

    /// Answered.
    Closed,
}

impl TicketStatus {
    /// Stable lowercase name used in API responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}
