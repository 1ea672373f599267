//! Store subscription billing: checkout-preference creation against
//! MercadoPago and the webhook-driven activation reconciliation flow.

pub mod activation;
pub mod mercadopago;

pub use activation::{ActivationOutcome, ActivationPoller, ActivationState};
pub use mercadopago::{CheckoutPreference, MercadoPagoClient, PaymentInfo, WebhookNotification};
