use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tillpoint_core::{AggregateId, DomainError, DomainResult, Entity};

/// Deliverer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DelivererId(pub AggregateId);

impl DelivererId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for DelivererId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Deliverer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverer {
    pub id: DelivererId,
    pub name: String,
    pub phone: String,
    pub vehicle: Option<String>,
}

impl Entity for Deliverer {
    type Id = DelivererId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Session-scoped deliverer directory.
#[derive(Debug, Clone)]
pub struct DelivererDirectory {
    deliverers: Vec<Deliverer>,
}

impl DelivererDirectory {
    pub fn new(deliverers: Vec<Deliverer>) -> Self {
        Self { deliverers }
    }

    /// Sample deliverers the demo terminal starts with.
    pub fn sample() -> Self {
        let rows: &[(u128, &str, &str, &str)] = &[
            (1, "Mike Johnson", "(555) 111-2222", "Motorcycle"),
            (2, "Sarah Wilson", "(555) 333-4444", "Car"),
            (3, "David Brown", "(555) 555-6666", "Bicycle"),
        ];
        let deliverers = rows
            .iter()
            .map(|(n, name, phone, vehicle)| Deliverer {
                id: DelivererId::new(AggregateId::from_uuid(Uuid::from_u128(*n))),
                name: (*name).to_string(),
                phone: (*phone).to_string(),
                vehicle: Some((*vehicle).to_string()),
            })
            .collect();
        Self { deliverers }
    }

    pub fn all(&self) -> &[Deliverer] {
        &self.deliverers
    }

    pub fn by_id(&self, id: &DelivererId) -> Option<&Deliverer> {
        self.deliverers.iter().find(|d| d.id == *id)
    }

    /// Substring search over name and vehicle (case-insensitive) and phone.
    pub fn search(&self, term: &str) -> Vec<&Deliverer> {
        let lowered = term.to_lowercase();
        self.deliverers
            .iter()
            .filter(|d| {
                d.name.to_lowercase().contains(&lowered)
                    || d.phone.contains(term)
                    || d.vehicle
                        .as_deref()
                        .is_some_and(|v| v.to_lowercase().contains(&lowered))
            })
            .collect()
    }

    /// Register a new deliverer with a fresh identity.
    ///
    /// A non-blank name is required; a blank vehicle is stored as `None`.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        phone: impl Into<String>,
        vehicle: Option<String>,
    ) -> DomainResult<Deliverer> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("deliverer name cannot be empty"));
        }

        let vehicle = vehicle
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let deliverer = Deliverer {
            id: DelivererId::new(AggregateId::new()),
            name: name.trim().to_string(),
            phone: phone.into().trim().to_string(),
            vehicle,
        };
        self.deliverers.push(deliverer.clone());
        Ok(deliverer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_matches_vehicle_case_insensitively() {
        let directory = DelivererDirectory::sample();
        let hits = directory.search("motor");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Mike Johnson");
    }

    #[test]
    fn search_matches_phone_digits() {
        let directory = DelivererDirectory::sample();
        let hits = directory.search("333");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sarah Wilson");
    }

    #[test]
    fn add_normalizes_blank_vehicle_to_none() {
        let mut directory = DelivererDirectory::sample();
        let deliverer = directory
            .add("Pat Lee", "(555) 777-8888", Some("  ".to_string()))
            .unwrap();
        assert_eq!(deliverer.vehicle, None);
        assert_eq!(directory.all().len(), 4);
    }

    #[test]
    fn add_rejects_blank_name() {
        let mut directory = DelivererDirectory::sample();
        let err = directory.add("", "(555) 000-0000", None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(directory.all().len(), 3);
    }
}
