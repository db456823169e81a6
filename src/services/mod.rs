//! Service layer: business rules over the repositories

pub mod catalog;
pub mod circulation;
pub mod membership;
pub mod reports;

use crate::repository::Repository;

/// All services, constructed over one shared repository
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub membership: membership::MembershipService,
    pub circulation: circulation::CirculationService,
    pub reports: reports::ReportsService,
}

impl Services {
    pub fn new(repository: Repository) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            membership: membership::MembershipService::new(repository.clone()),
            circulation: circulation::CirculationService::new(repository.clone()),
            reports: reports::ReportsService::new(repository),
        }
    }
}
