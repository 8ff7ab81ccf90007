pub mod call;
pub mod doctor;
pub mod reindex;
pub mod routes;
