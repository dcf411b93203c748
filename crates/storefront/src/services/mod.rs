//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Customer identity (email/password, password reset, session)
//! - `checkout` - Order placement and WhatsApp hand-off
//! - `import` - Batch product import from CSV

pub mod auth;
pub mod checkout;
pub mod import;
