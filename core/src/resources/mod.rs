//! Typed wrappers over `Client::call`, one per API resource.
//!
//! Each wrapper borrows the client, builds the path and picks the verb; all
//! encoding, authentication and decoding happens in the shared pipeline.

mod customer;
mod order;
mod payment;
mod payment_link;
mod refund;

pub use customer::{Customer, CustomerList, CustomerParams, Customers};
pub use order::{Order, OrderList, OrderListParams, OrderParams, Orders};
pub use payment::{Card, Payment, PaymentCaptureParams, PaymentList, PaymentUpdateParams, Payments};
pub use payment_link::{
    NotifyMedium, PaymentLink, PaymentLinkList, PaymentLinkListParams, PaymentLinkNotify,
    PaymentLinkNotifyParams, PaymentLinkParams, PaymentLinkPayment, PaymentLinkReminders,
    PaymentLinks,
};
pub use refund::{Refund, RefundCreateParams, RefundList, RefundUpdateParams, Refunds};
