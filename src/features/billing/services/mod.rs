mod invoice_service;

pub use invoice_service::{
    format_invoice_number, price_items, InvoiceService, PricedItem, RenderedFile,
};
