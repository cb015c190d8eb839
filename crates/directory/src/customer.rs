use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tillpoint_core::{AggregateId, DomainError, DomainResult, Entity};

/// Customer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub AggregateId);

impl CustomerId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Customer record: identity plus contact attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Session-scoped customer directory.
#[derive(Debug, Clone)]
pub struct CustomerDirectory {
    customers: Vec<Customer>,
}

impl CustomerDirectory {
    pub fn new(customers: Vec<Customer>) -> Self {
        Self { customers }
    }

    /// Sample customers the demo terminal starts with.
    pub fn sample() -> Self {
        let rows: &[(u128, &str, &str, &str)] = &[
            (1, "John Doe", "john@example.com", "(555) 123-4567"),
            (2, "Jane Smith", "jane@example.com", "(555) 987-6543"),
            (3, "Bob Johnson", "bob@example.com", "(555) 456-7890"),
        ];
        let customers = rows
            .iter()
            .map(|(n, name, email, phone)| Customer {
                id: CustomerId::new(AggregateId::from_uuid(Uuid::from_u128(*n))),
                name: (*name).to_string(),
                email: (*email).to_string(),
                phone: (*phone).to_string(),
            })
            .collect();
        Self { customers }
    }

    pub fn all(&self) -> &[Customer] {
        &self.customers
    }

    pub fn by_id(&self, id: &CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == *id)
    }

    /// Substring search over name and email (case-insensitive) and phone.
    pub fn search(&self, term: &str) -> Vec<&Customer> {
        let lowered = term.to_lowercase();
        self.customers
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&lowered)
                    || c.email.to_lowercase().contains(&lowered)
                    || c.phone.contains(term)
            })
            .collect()
    }

    /// Register a new customer with a fresh identity.
    ///
    /// A non-blank name is required; email and phone may be empty. The new
    /// record joins the session list and is returned for immediate selection.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> DomainResult<Customer> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }

        let customer = Customer {
            id: CustomerId::new(AggregateId::new()),
            name: name.trim().to_string(),
            email: email.into().trim().to_string(),
            phone: phone.into().trim().to_string(),
        };
        self.customers.push(customer.clone());
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_matches_name_case_insensitively() {
        let directory = CustomerDirectory::sample();
        let hits = directory.search("jane");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Jane Smith");
    }

    #[test]
    fn search_matches_email_and_phone() {
        let directory = CustomerDirectory::sample();
        assert_eq!(directory.search("bob@").len(), 1);
        assert_eq!(directory.search("987").len(), 1);
    }

    #[test]
    fn search_with_no_match_is_empty() {
        let directory = CustomerDirectory::sample();
        assert!(directory.search("nobody").is_empty());
    }

    #[test]
    fn add_assigns_fresh_identity_and_joins_session_list() {
        let mut directory = CustomerDirectory::sample();
        let customer = directory
            .add("  Alice Cooper ", "alice@example.com", "")
            .unwrap();
        assert_eq!(customer.name, "Alice Cooper");
        assert_eq!(directory.all().len(), 4);
        assert_eq!(directory.by_id(&customer.id), Some(&customer));
    }

    #[test]
    fn add_rejects_blank_name() {
        let mut directory = CustomerDirectory::sample();
        let err = directory.add("   ", "x@example.com", "555").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(directory.all().len(), 3);
    }
}
