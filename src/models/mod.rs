pub mod container;
pub mod customer;
pub mod invoice;
pub mod invoice_line;
pub mod payment;
pub mod port;
pub mod route;
pub mod shipment;
pub mod shipment_container;
pub mod tracking_event;
pub mod vessel;

pub use container::ContainerSize;
pub use invoice::InvoiceStatus;
pub use payment::PaymentMethod;
pub use shipment::ShipmentStatus;
pub use tracking_event::TrackingEventType;
