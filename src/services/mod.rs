pub mod containers;
pub mod customers;
pub mod invoicing;
pub mod payments;
pub mod ports;
pub mod routes;
pub mod shipments;
pub mod vessels;

pub use containers::ContainerService;
pub use customers::CustomerService;
pub use invoicing::InvoicingService;
pub use payments::PaymentService;
pub use ports::PortService;
pub use routes::RouteService;
pub use shipments::ShipmentService;
pub use vessels::VesselService;
