use serde::{Deserialize, Serialize};

use crate::workflows::eligibility::{CASE_SPECIFIC_CONSULTATION, EXPLORATORY_CONSULTATION};

/// A bookable service with its fixed price and scheduling link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub slug: String,
    pub title: String,
    pub price_label: String,
    pub amount_cents: u64,
    pub description: String,
    pub scheduling_url: String,
}

impl ServiceOffering {
    fn new(
        slug: &str,
        title: &str,
        price_label: &str,
        amount_cents: u64,
        description: &str,
        scheduling_url: &str,
    ) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            price_label: price_label.to_string(),
            amount_cents,
            description: description.to_string(),
            scheduling_url: scheduling_url.to_string(),
        }
    }
}

/// Ordered list of offerings; the first entry is the fallback for unknown slugs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCatalog {
    offerings: Vec<ServiceOffering>,
}

impl ServiceCatalog {
    pub fn standard() -> Self {
        Self {
            offerings: vec![
                ServiceOffering::new(
                    EXPLORATORY_CONSULTATION,
                    "Exploratory Consultation",
                    "$150",
                    15_000,
                    "30-minute initial assessment of your immigration options.",
                    "https://calendly.com/pathway/exploratory",
                ),
                ServiceOffering::new(
                    CASE_SPECIFIC_CONSULTATION,
                    "Case-Specific Consultation",
                    "$250",
                    25_000,
                    "60-minute detailed analysis of your specific case.",
                    "https://calendly.com/pathway/case-specific",
                ),
                ServiceOffering::new(
                    "full-representation",
                    "Full Representation",
                    "From $2,500",
                    250_000,
                    "Complete end-to-end immigration application handling.",
                    "https://calendly.com/pathway/full-representation",
                ),
                ServiceOffering::new(
                    "application-review",
                    "Application Review",
                    "$350",
                    35_000,
                    "Expert review of your self-prepared application.",
                    "https://calendly.com/pathway/application-review",
                ),
                ServiceOffering::new(
                    "documentation-review",
                    "Documentation Review",
                    "$200",
                    20_000,
                    "Verification of your supporting documents.",
                    "https://calendly.com/pathway/documentation-review",
                ),
            ],
        }
    }

    pub fn offerings(&self) -> &[ServiceOffering] {
        &self.offerings
    }

    pub fn get(&self, slug: &str) -> Option<&ServiceOffering> {
        self.offerings.iter().find(|offering| offering.slug == slug)
    }

    /// Exact slug, or the slug with a trailing `-consultation` removed.
    pub fn normalize(&self, raw: &str) -> Option<&ServiceOffering> {
        let slug = raw.trim();
        self.get(slug).or_else(|| {
            slug.strip_suffix("-consultation")
                .and_then(|trimmed| self.get(trimmed))
        })
    }

    /// Resolve a requested slug, falling back to the first offering.
    pub fn resolve(&self, raw: Option<&str>) -> &ServiceOffering {
        // Catalogs are only built through `standard()`, which is never empty.
        raw.and_then(|slug| self.normalize(slug))
            .unwrap_or(&self.offerings[0])
    }

    /// Replace the scheduling link for one offering (e.g. per-deployment calendar URLs).
    pub fn with_scheduling_url(mut self, slug: &str, url: impl Into<String>) -> Self {
        if let Some(offering) = self.offerings.iter_mut().find(|o| o.slug == slug) {
            offering.scheduling_url = url.into();
        }
        self
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
