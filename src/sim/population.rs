//! Enemy population
//!
//! Owns every live enemy from creation until deletion. Enemies are kept sorted
//! by id so iteration order is stable.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::placement::PlacementResolver;
use super::state::{Enemy, EnemyCategory, EnemyVariant, RemovalCause, SpawnRequest};
use crate::config::SessionConfig;
use crate::error::{ConfigError, PopulationError, SpawnError, swallow};
use crate::world::{EntityFactory, SpatialQuery, SurfaceMask};
use crate::{disk_point, horizontal};

pub struct EnemyPopulation {
    enemies: Vec<Enemy>,
    prefabs: Vec<EnemyVariant>,
    zone_center: Vec2,
    zone_radius: f32,
    ground_layer: u32,
    /// Cached at initialization
    ground_mask: SurfaceMask,
    resolver: PlacementResolver,
    query: Box<dyn SpatialQuery>,
    factory: Box<dyn EntityFactory>,
    next_id: u32,
}

impl EnemyPopulation {
    /// Build an empty population. Fails on a configuration that could not
    /// spawn anything.
    pub fn new(
        config: &SessionConfig,
        query: Box<dyn SpatialQuery>,
        factory: Box<dyn EntityFactory>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut population = Self {
            enemies: Vec::new(),
            prefabs: config.prefabs.clone(),
            zone_center: horizontal(config.zone_center),
            zone_radius: config.zone_radius,
            ground_layer: config.ground_layer,
            ground_mask: SurfaceMask::NONE,
            resolver: PlacementResolver::from_config(config, SurfaceMask::NONE),
            query,
            factory,
            next_id: 1,
        };
        population.initialize();
        Ok(population)
    }

    /// Drop every tracked enemy and refresh the cached ground mask
    pub fn initialize(&mut self) {
        for enemy in self.enemies.drain(..) {
            swallow(self.factory.destroy(enemy.handle));
        }
        self.ground_mask = SurfaceMask::layer(self.ground_layer);
        self.resolver.mask = self.ground_mask;
    }

    pub fn ground_mask(&self) -> SurfaceMask {
        self.ground_mask
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Enemy> {
        self.index_of(id).map(|i| &self.enemies[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    /// Live enemies of one category
    pub fn count_of(&self, category: EnemyCategory) -> usize {
        self.enemies.iter().filter(|e| e.category == category).count()
    }

    pub fn prefabs(&self) -> &[EnemyVariant] {
        &self.prefabs
    }

    fn index_of(&self, id: u32) -> Option<usize> {
        self.enemies.binary_search_by_key(&id, |e| e.id).ok()
    }

    /// Create one enemy from a uniformly chosen variant
    pub fn create_enemy(&mut self, health: u32, rng: &mut Pcg32) -> Result<u32, SpawnError> {
        let variant = rng.random_range(0..self.prefabs.len());
        self.create_variant(variant, health, rng)
    }

    fn create_variant(&mut self, variant: usize, health: u32, rng: &mut Pcg32) -> Result<u32, SpawnError> {
        let center = self.zone_center;
        let radius = self.zone_radius;
        let start = disk_point(center, radius, rng.random(), rng.random());
        let position = self.resolver.resolve_spawn_height(self.query.as_ref(), start, || {
            disk_point(center, radius, rng.random(), rng.random())
        })?;

        let prefab = &self.prefabs[variant];
        let handle = self.factory.spawn(prefab, position, prefab.orientation)?;

        let id = self.next_id;
        self.next_id += 1;
        // Ids only grow, so pushing keeps the collection sorted
        self.enemies.push(Enemy {
            id,
            handle,
            category: prefab.category,
            variant,
            health,
            position,
        });
        log::debug!("Spawned {} #{} at {:?}", prefab.name, id, position);
        Ok(id)
    }

    /// Materialize a spawn request, returning the ids that were created.
    /// Individual failures are logged and skipped.
    pub fn spawn(&mut self, request: &SpawnRequest, rng: &mut Pcg32) -> Vec<u32> {
        let candidates: Vec<usize> = self
            .prefabs
            .iter()
            .enumerate()
            .filter(|(_, v)| request.categories.is_empty() || request.categories.contains(&v.category))
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            log::warn!("No prefab matches categories {:?}", request.categories);
            return Vec::new();
        }

        let mut spawned = Vec::new();
        for _ in 0..request.count {
            let variant = candidates[rng.random_range(0..candidates.len())];
            match self.create_variant(variant, request.health, rng) {
                Ok(id) => spawned.push(id),
                Err(e) => log::warn!("Spawn failed: {}", e),
            }
        }
        spawned
    }

    /// Remove a killed enemy. `on_removed` sees it while it is still tracked.
    pub fn delete_enemy(
        &mut self,
        id: u32,
        mut on_removed: impl FnMut(&Enemy, RemovalCause),
    ) -> Result<Enemy, PopulationError> {
        let index = self.index_of(id).ok_or(PopulationError::NotFound(id))?;
        on_removed(&self.enemies[index], RemovalCause::Killed);
        let enemy = self.enemies.remove(index);
        swallow(self.factory.destroy(enemy.handle));
        Ok(enemy)
    }

    /// Damage an enemy, deleting it through the kill path once its health runs
    /// out. Returns whether it died.
    pub fn damage_enemy(
        &mut self,
        id: u32,
        amount: u32,
        on_removed: impl FnMut(&Enemy, RemovalCause),
    ) -> Result<bool, PopulationError> {
        let index = self.index_of(id).ok_or(PopulationError::NotFound(id))?;
        if !self.enemies[index].apply_damage(amount) {
            return Ok(false);
        }
        self.delete_enemy(id, on_removed)?;
        Ok(true)
    }

    /// Force-delete every enemy, then clear the collection in one step
    pub fn delete_all_enemies(&mut self, mut on_removed: impl FnMut(&Enemy, RemovalCause)) {
        let snapshot = self.enemies.clone();
        for enemy in &snapshot {
            on_removed(enemy, RemovalCause::Forced);
            swallow(self.factory.destroy(enemy.handle));
        }
        self.enemies.clear();
        if !snapshot.is_empty() {
            log::debug!("Cleared {} enemies", snapshot.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdapterError;
    use crate::world::{EntityHandle, FlatGround, HeadlessEntityFactory};
    use glam::{Quat, Vec3};
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Factory that records destroyed handles for inspection
    #[derive(Clone, Default)]
    struct TrackingFactory {
        inner: Rc<RefCell<HeadlessEntityFactory>>,
        destroyed: Rc<RefCell<Vec<EntityHandle>>>,
    }

    impl EntityFactory for TrackingFactory {
        fn spawn(&mut self, variant: &EnemyVariant, position: Vec3, orientation: Quat) -> Result<EntityHandle, AdapterError> {
            self.inner.borrow_mut().spawn(variant, position, orientation)
        }

        fn destroy(&mut self, handle: EntityHandle) -> Result<(), AdapterError> {
            self.destroyed.borrow_mut().push(handle);
            self.inner.borrow_mut().destroy(handle)
        }
    }

    fn population(factory: TrackingFactory) -> EnemyPopulation {
        let config = SessionConfig::default();
        let ground = FlatGround::new(0.0, config.ground_layer);
        EnemyPopulation::new(&config, Box::new(ground), Box::new(factory)).unwrap()
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_rejects_empty_prefab_pool() {
        let config = SessionConfig {
            prefabs: Vec::new(),
            ..Default::default()
        };
        let result = EnemyPopulation::new(
            &config,
            Box::new(FlatGround::new(0.0, 3)),
            Box::new(HeadlessEntityFactory::new()),
        );
        assert!(matches!(result, Err(ConfigError::EmptyPrefabPool)));
    }

    #[test]
    fn test_initialize_caches_ground_mask() {
        let pop = population(TrackingFactory::default());
        assert_eq!(pop.ground_mask(), SurfaceMask::layer(SessionConfig::default().ground_layer));
    }

    #[test]
    fn test_create_places_inside_zone_on_ground() {
        let mut pop = population(TrackingFactory::default());
        let mut rng = rng();
        for _ in 0..20 {
            pop.create_enemy(3, &mut rng).unwrap();
        }
        assert_eq!(pop.len(), 20);
        for enemy in pop.iter() {
            assert!(horizontal(enemy.position).length() <= 20.0 + 1e-4);
            assert!((enemy.position.y - 0.15).abs() < 1e-5);
            assert_eq!(enemy.health, 3);
        }
        // Sorted by id
        let ids: Vec<u32> = pop.iter().map(|e| e.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_create_without_ground_is_placement_error() {
        let config = SessionConfig {
            max_placement_attempts: 4,
            ..Default::default()
        };
        let ground = FlatGround::new(0.0, config.ground_layer + 1);
        let mut pop = EnemyPopulation::new(&config, Box::new(ground), Box::new(HeadlessEntityFactory::new())).unwrap();
        let err = pop.create_enemy(1, &mut rng()).unwrap_err();
        assert!(matches!(err, SpawnError::Placement(_)));
        assert!(pop.is_empty());
    }

    #[test]
    fn test_delete_notifies_before_removal() {
        let factory = TrackingFactory::default();
        let mut pop = population(factory.clone());
        let mut rng = rng();
        let id = pop.create_enemy(1, &mut rng).unwrap();
        let handle = pop.get(id).unwrap().handle;

        let mut seen = None;
        let removed = pop
            .delete_enemy(id, |enemy, cause| {
                assert!(enemy.is_alive());
                seen = Some((enemy.id, cause));
            })
            .unwrap();
        assert_eq!(seen, Some((id, RemovalCause::Killed)));
        assert_eq!(removed.id, id);
        assert!(pop.get(id).is_none());
        assert_eq!(*factory.destroyed.borrow(), vec![handle]);
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let mut pop = population(TrackingFactory::default());
        let mut calls = 0;
        let result = pop.delete_enemy(99, |_, _| calls += 1);
        assert_eq!(result.unwrap_err(), PopulationError::NotFound(99));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_damage_until_dead() {
        let mut pop = population(TrackingFactory::default());
        let id = pop.create_enemy(2, &mut rng()).unwrap();
        assert!(!pop.damage_enemy(id, 1, |_, _| {}).unwrap());
        assert_eq!(pop.get(id).unwrap().health, 1);
        assert!(pop.damage_enemy(id, 1, |_, _| {}).unwrap());
        assert!(pop.is_empty());
    }

    #[test]
    fn test_delete_all_broadcasts_then_clears() {
        let factory = TrackingFactory::default();
        let mut pop = population(factory.clone());
        let mut rng = rng();
        for _ in 0..5 {
            pop.create_enemy(1, &mut rng).unwrap();
        }
        let mut forced = Vec::new();
        pop.delete_all_enemies(|enemy, cause| {
            assert_eq!(cause, RemovalCause::Forced);
            forced.push(enemy.id);
        });
        assert_eq!(forced, vec![1, 2, 3, 4, 5]);
        assert!(pop.is_empty());
        assert_eq!(factory.destroyed.borrow().len(), 5);
        assert_eq!(factory.inner.borrow().live_count(), 0);
    }

    #[test]
    fn test_spawn_request_filters_categories() {
        let mut pop = population(TrackingFactory::default());
        let request = SpawnRequest {
            count: 12,
            health: 1,
            categories: vec![EnemyCategory::Rabbit],
        };
        let ids = pop.spawn(&request, &mut rng());
        assert_eq!(ids.len(), 12);
        assert_eq!(pop.count_of(EnemyCategory::Rabbit), 12);
        assert_eq!(pop.count_of(EnemyCategory::Duck), 0);
    }

    #[test]
    fn test_spawn_request_with_unknown_category_spawns_nothing() {
        let config = SessionConfig {
            prefabs: vec![EnemyVariant::new("mallard", EnemyCategory::Duck)],
            ..Default::default()
        };
        let ground = FlatGround::new(0.0, config.ground_layer);
        let mut pop = EnemyPopulation::new(&config, Box::new(ground), Box::new(HeadlessEntityFactory::new())).unwrap();
        let request = SpawnRequest {
            count: 3,
            health: 1,
            categories: vec![EnemyCategory::Deer],
        };
        assert!(pop.spawn(&request, &mut rng()).is_empty());
        assert!(pop.is_empty());
    }
}
