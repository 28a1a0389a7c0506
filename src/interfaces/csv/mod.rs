pub mod callback_reader;
pub mod invoice_writer;
