// Application layer - Use cases over the plant repository
pub mod plant_repository;
pub mod plant_service;
pub mod resolution_service;
pub mod selection;
pub mod streaming_service;

#[cfg(test)]
pub mod test_support;
