use ahash::AHashMap;

use crate::problem::{CityId, Num, PlanningError};

/// Road network queries the planner consumes.
pub trait DistanceOracle {
    fn distance(&self, from: CityId, to: CityId) -> Num;
    /// Cities visited after `from` on a shortest path, ending with `to`.
    fn path(&self, from: CityId, to: CityId) -> Vec<CityId>;
    fn neighbors(&self, city: CityId) -> Vec<CityId>;
}

#[derive(Debug, Clone)]
pub struct City {
    pub id: CityId,
    pub name: String,
}

/// Undirected road graph with precomputed all-pairs shortest paths.
#[derive(Debug, Clone)]
pub struct Topology {
    n: usize,
    cities: Vec<City>,
    by_name: AHashMap<String, CityId>,
    adjacency: Vec<Vec<CityId>>,
    distances: Vec<Num>,
    next_hop: Vec<Option<CityId>>,
}

impl Topology {
    #[inline(always)]
    fn idx(&self, from: CityId, to: CityId) -> usize {
        debug_assert!(from < self.n);
        debug_assert!(to < self.n);
        from * self.n + to
    }

    pub fn num_cities(&self) -> usize {
        self.n
    }

    pub fn name(&self, id: CityId) -> &str {
        self.cities[id].name.as_str()
    }

    pub fn city_id(&self, name: &str) -> Option<CityId> {
        self.by_name.get(name).copied()
    }

    pub fn is_reachable(&self, from: CityId, to: CityId) -> bool {
        self.distances[self.idx(from, to)].is_finite()
    }
}

impl DistanceOracle for Topology {
    #[inline(always)]
    fn distance(&self, from: CityId, to: CityId) -> Num {
        self.distances[self.idx(from, to)]
    }

    fn path(&self, from: CityId, to: CityId) -> Vec<CityId> {
        let mut path = Vec::new();
        let mut current = from;
        while current != to && path.len() < self.n {
            match self.next_hop[self.idx(current, to)] {
                Some(hop) => {
                    path.push(hop);
                    current = hop;
                }
                None => break,
            }
        }
        path
    }

    fn neighbors(&self, city: CityId) -> Vec<CityId> {
        self.adjacency[city].clone()
    }
}

pub struct TopologyBuilder {
    cities: Vec<City>,
    by_name: AHashMap<String, CityId>,
    roads: Vec<(CityId, CityId, Num)>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self {
            cities: vec![],
            by_name: AHashMap::new(),
            roads: vec![],
        }
    }

    pub fn add_city(&mut self, name: impl Into<String>) -> Result<CityId, PlanningError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(PlanningError::InvalidTopology(format!(
                "duplicate city {}",
                name
            )));
        }
        let id = self.cities.len();
        self.by_name.insert(name.clone(), id);
        self.cities.push(City { id, name });
        Ok(id)
    }

    pub fn add_road(
        &mut self,
        from: &str,
        to: &str,
        length: Num,
    ) -> Result<&mut Self, PlanningError> {
        if !length.is_finite() || length < 0.0 {
            return Err(PlanningError::InvalidTopology(format!(
                "road {} - {} has invalid length {}",
                from, to, length
            )));
        }
        let a = self.lookup(from)?;
        let b = self.lookup(to)?;
        self.roads.push((a, b, length));
        Ok(self)
    }

    fn lookup(&self, name: &str) -> Result<CityId, PlanningError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| PlanningError::UnknownCity(name.to_string()))
    }

    /// Floyd-Warshall over the road graph.
    pub fn build(self) -> Topology {
        let n = self.cities.len();
        let mut distances = vec![Num::INFINITY; n * n];
        let mut next_hop: Vec<Option<CityId>> = vec![None; n * n];
        let mut adjacency = vec![Vec::new(); n];

        for i in 0..n {
            distances[i * n + i] = 0.0;
        }
        for &(a, b, length) in &self.roads {
            if a == b {
                continue;
            }
            if !adjacency[a].contains(&b) {
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
            if length < distances[a * n + b] {
                distances[a * n + b] = length;
                distances[b * n + a] = length;
                next_hop[a * n + b] = Some(b);
                next_hop[b * n + a] = Some(a);
            }
        }

        for k in 0..n {
            for i in 0..n {
                let d_ik = distances[i * n + k];
                if !d_ik.is_finite() {
                    continue;
                }
                for j in 0..n {
                    let via_k = d_ik + distances[k * n + j];
                    if via_k < distances[i * n + j] {
                        distances[i * n + j] = via_k;
                        next_hop[i * n + j] = next_hop[i * n + k];
                    }
                }
            }
        }

        for neighbors in adjacency.iter_mut() {
            neighbors.sort();
        }

        Topology {
            n,
            cities: self.cities,
            by_name: self.by_name,
            adjacency,
            distances,
            next_hop,
        }
    }
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
