// Plant service - Use case for listing plants
use crate::application::plant_repository::{BackendError, PlantRepository};
use crate::domain::plant::Plant;
use std::sync::Arc;

#[derive(Clone)]
pub struct PlantService {
    repository: Arc<dyn PlantRepository>,
}

impl PlantService {
    pub fn new(repository: Arc<dyn PlantRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_plants(&self) -> Result<Vec<Plant>, BackendError> {
        let mut plants = self.repository.list_plants().await?;
        plants.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(plants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::FakeRepository;

    #[tokio::test]
    async fn test_plants_sorted_by_name() {
        let repository = FakeRepository::default().with_plants(vec![
            Plant::new("b".to_string(), Some("west field".to_string())),
            Plant::new("a".to_string(), Some("East Roof".to_string())),
        ]);
        let service = PlantService::new(Arc::new(repository));

        let plants = service.list_plants().await.unwrap();
        let names: Vec<&str> = plants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["East Roof", "west field"]);
    }
}
