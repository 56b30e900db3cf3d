//! Unified error codes for the POS server
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog (menu / inventory) errors
//! - 7xxx: Table and session errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can match on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password or PIN)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// PIN has expired
    PinExpired = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Special access token required
    SpecialAccessRequired = 2006,
    /// Bootstrap is closed because users already exist
    BootstrapClosed = 2007,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order line not found
    OrderItemNotFound = 4005,
    /// Order is not ready for payment
    OrderNotReady = 4008,
    /// Order lines can no longer be edited
    OrderNotEditable = 4009,
    /// No payable orders for the table
    NoOrdersForPayment = 4010,

    // ==================== 5xxx: Payment ====================
    /// Invalid payment amount
    InvalidPaymentAmount = 5003,
    /// Payment method breakdown does not match the amount
    PaymentMethodMismatch = 5004,

    // ==================== 6xxx: Catalog ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Category not found
    CategoryNotFound = 6002,
    /// Category still has menu items
    CategoryHasItems = 6003,
    /// Inventory item not found
    InventoryItemNotFound = 6004,
    /// Not enough stock for an ingredient
    InsufficientStock = 6005,
    /// Recipe unit cannot be converted to the stock unit
    IncompatibleUnits = 6006,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is not available
    TableNotAvailable = 7002,
    /// Table already has an open session
    SessionAlreadyOpen = 7003,
    /// Table session not found
    SessionNotFound = 7004,
    /// Table session already closed
    SessionClosed = 7005,
    /// Table still has unpaid orders
    UnpaidOrders = 7006,
    /// Virtual table not found
    VirtualTableNotFound = 7007,
    /// Virtual table is occupied
    VirtualTableOccupied = 7008,
    /// Physical table already belongs to an active virtual table
    PhysicalTableInUse = 7009,
    /// Removing the last physical table of a virtual table
    LastPhysicalTable = 7010,
    /// Operation not valid for the virtual table mode
    InvalidVirtualTableMode = 7011,
    /// Section not found
    SectionNotFound = 7012,
    /// Reservation not found
    ReservationNotFound = 7013,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// Username already exists
    UsernameExists = 8002,
    /// PIN already assigned to another user
    PinExists = 8003,
    /// Role not found
    RoleNotFound = 8004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid credentials",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Invalid token",
            ErrorCode::PinExpired => "PIN has expired",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Admin role required",
            ErrorCode::SpecialAccessRequired => "Special access token required",
            ErrorCode::BootstrapClosed => "Users already exist",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderNotReady => "Order is not ready for payment",
            ErrorCode::OrderNotEditable => "Order can no longer be edited",
            ErrorCode::NoOrdersForPayment => "No orders ready for payment",

            // Payment
            ErrorCode::InvalidPaymentAmount => "Invalid payment amount",
            ErrorCode::PaymentMethodMismatch => "Payment methods do not match the amount",

            // Catalog
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasItems => "Category still has menu items",
            ErrorCode::InventoryItemNotFound => "Inventory item not found",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::IncompatibleUnits => "Incompatible units",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNotAvailable => "Table is not available",
            ErrorCode::SessionAlreadyOpen => "Table already has an open session",
            ErrorCode::SessionNotFound => "Table session not found",
            ErrorCode::SessionClosed => "Table session is closed",
            ErrorCode::UnpaidOrders => "Table has unpaid orders",
            ErrorCode::VirtualTableNotFound => "Virtual table not found",
            ErrorCode::VirtualTableOccupied => "Virtual table is occupied",
            ErrorCode::PhysicalTableInUse => "Table belongs to another active virtual table",
            ErrorCode::LastPhysicalTable => "Cannot remove the last table of a virtual table",
            ErrorCode::InvalidVirtualTableMode => "Operation not valid for this virtual table mode",
            ErrorCode::SectionNotFound => "Section not found",
            ErrorCode::ReservationNotFound => "Reservation not found",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::PinExists => "PIN already in use",
            ErrorCode::RoleNotFound => "Role not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1008 => Ok(ErrorCode::PinExpired),

            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2006 => Ok(ErrorCode::SpecialAccessRequired),
            2007 => Ok(ErrorCode::BootstrapClosed),

            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4005 => Ok(ErrorCode::OrderItemNotFound),
            4008 => Ok(ErrorCode::OrderNotReady),
            4009 => Ok(ErrorCode::OrderNotEditable),
            4010 => Ok(ErrorCode::NoOrdersForPayment),

            5003 => Ok(ErrorCode::InvalidPaymentAmount),
            5004 => Ok(ErrorCode::PaymentMethodMismatch),

            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::CategoryNotFound),
            6003 => Ok(ErrorCode::CategoryHasItems),
            6004 => Ok(ErrorCode::InventoryItemNotFound),
            6005 => Ok(ErrorCode::InsufficientStock),
            6006 => Ok(ErrorCode::IncompatibleUnits),

            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableNotAvailable),
            7003 => Ok(ErrorCode::SessionAlreadyOpen),
            7004 => Ok(ErrorCode::SessionNotFound),
            7005 => Ok(ErrorCode::SessionClosed),
            7006 => Ok(ErrorCode::UnpaidOrders),
            7007 => Ok(ErrorCode::VirtualTableNotFound),
            7008 => Ok(ErrorCode::VirtualTableOccupied),
            7009 => Ok(ErrorCode::PhysicalTableInUse),
            7010 => Ok(ErrorCode::LastPhysicalTable),
            7011 => Ok(ErrorCode::InvalidVirtualTableMode),
            7012 => Ok(ErrorCode::SectionNotFound),
            7013 => Ok(ErrorCode::ReservationNotFound),

            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UsernameExists),
            8003 => Ok(ErrorCode::PinExists),
            8004 => Ok(ErrorCode::RoleNotFound),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::PinExpired.code(), 1008);
        assert_eq!(ErrorCode::OrderAlreadyPaid.code(), 4002);
        assert_eq!(ErrorCode::InsufficientStock.code(), 6005);
        assert_eq!(ErrorCode::SessionAlreadyOpen.code(), 7003);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_covers_every_code() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::NotAuthenticated,
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::PinExpired,
            ErrorCode::PermissionDenied,
            ErrorCode::AdminRequired,
            ErrorCode::SpecialAccessRequired,
            ErrorCode::BootstrapClosed,
            ErrorCode::OrderNotFound,
            ErrorCode::OrderAlreadyPaid,
            ErrorCode::OrderItemNotFound,
            ErrorCode::OrderNotReady,
            ErrorCode::OrderNotEditable,
            ErrorCode::NoOrdersForPayment,
            ErrorCode::InvalidPaymentAmount,
            ErrorCode::PaymentMethodMismatch,
            ErrorCode::MenuItemNotFound,
            ErrorCode::CategoryNotFound,
            ErrorCode::CategoryHasItems,
            ErrorCode::InventoryItemNotFound,
            ErrorCode::InsufficientStock,
            ErrorCode::IncompatibleUnits,
            ErrorCode::TableNotFound,
            ErrorCode::TableNotAvailable,
            ErrorCode::SessionAlreadyOpen,
            ErrorCode::SessionNotFound,
            ErrorCode::SessionClosed,
            ErrorCode::UnpaidOrders,
            ErrorCode::VirtualTableNotFound,
            ErrorCode::VirtualTableOccupied,
            ErrorCode::PhysicalTableInUse,
            ErrorCode::LastPhysicalTable,
            ErrorCode::InvalidVirtualTableMode,
            ErrorCode::SectionNotFound,
            ErrorCode::ReservationNotFound,
            ErrorCode::UserNotFound,
            ErrorCode::UsernameExists,
            ErrorCode::PinExists,
            ErrorCode::RoleNotFound,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::ConfigError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(6), Err(InvalidErrorCode(6)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::InsufficientStock).unwrap();
        assert_eq!(json, "6005");
        let code: ErrorCode = serde_json::from_str("7006").unwrap();
        assert_eq!(code, ErrorCode::UnpaidOrders);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }
}
