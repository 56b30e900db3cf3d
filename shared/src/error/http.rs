//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    ///
    /// Conflicts (duplicate names, an already open session) are reported as
    /// 400 like every other business rule violation.
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::NoOrdersForPayment
            | Self::MenuItemNotFound
            | Self::CategoryNotFound
            | Self::InventoryItemNotFound
            | Self::TableNotFound
            | Self::SessionNotFound
            | Self::VirtualTableNotFound
            | Self::SectionNotFound
            | Self::ReservationNotFound
            | Self::UserNotFound
            | Self::RoleNotFound => StatusCode::NOT_FOUND,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::PinExpired => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::AdminRequired
            | Self::SpecialAccessRequired
            | Self::BootstrapClosed => StatusCode::FORBIDDEN,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (validation, stock, conflicts, state rules)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
