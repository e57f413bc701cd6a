use std::path::Path;

use anyhow::Context;
use log::info;

use crate::problem::pdp::{PDPInstance, Task, Vehicle};
use crate::problem::topology::{Topology, TopologyBuilder};
use crate::problem::CityId;

mod toml {
    use std::fs::File;
    use std::io::Read;

    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Config {
        pub name: Option<String>,
        pub cities: Vec<City>,
        #[serde(default)]
        pub roads: Vec<Road>,
        #[serde(default)]
        pub vehicles: Vec<Vehicle>,
        #[serde(default)]
        pub tasks: Vec<Task>,
    }

    #[derive(Debug, Deserialize)]
    pub struct City {
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Road {
        pub from: String,
        pub to: String,
        pub length: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Vehicle {
        pub id: usize,
        pub home: String,
        pub capacity: u32,
        pub cost_per_km: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Task {
        pub id: usize,
        pub pickup: String,
        pub delivery: String,
        pub weight: u32,
        #[serde(default)]
        pub reward: f64,
    }

    pub fn parse_config(content: &str) -> anyhow::Result<Config> {
        Ok(toml::from_str(content)?)
    }

    pub fn read_config(path: impl AsRef<std::path::Path>) -> anyhow::Result<Config> {
        let mut s = String::new();
        File::open(path)?.read_to_string(&mut s)?;
        parse_config(s.as_str())
    }
}

pub fn load_scenario(path: impl AsRef<Path>) -> anyhow::Result<PDPInstance> {
    let path = path.as_ref();
    let config = toml::read_config(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    let fallback_name = path
        .file_stem()
        .map(|it| it.to_string_lossy().to_string())
        .unwrap_or_default();
    create_instance(config, fallback_name)
}

pub fn parse_scenario(content: &str) -> anyhow::Result<PDPInstance> {
    create_instance(toml::parse_config(content)?, "scenario".to_string())
}

fn create_instance(config: toml::Config, fallback_name: String) -> anyhow::Result<PDPInstance> {
    let mut builder = TopologyBuilder::new();
    for city in &config.cities {
        builder.add_city(city.name.as_str())?;
    }
    for road in &config.roads {
        builder
            .add_road(road.from.as_str(), road.to.as_str(), road.length)
            .with_context(|| format!("invalid road {} - {}", road.from, road.to))?;
    }
    let topology = builder.build();

    let vehicles = config
        .vehicles
        .iter()
        .map(|v| {
            Ok(Vehicle {
                id: v.id,
                home: city(&topology, &v.home)?,
                capacity: v.capacity,
                cost_per_km: v.cost_per_km,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let tasks = config
        .tasks
        .iter()
        .map(|t| {
            Ok(Task {
                id: t.id,
                pickup: city(&topology, &t.pickup)?,
                delivery: city(&topology, &t.delivery)?,
                weight: t.weight,
                reward: t.reward,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let name = config.name.unwrap_or(fallback_name);
    info!(
        "scenario {}: {} cities, {} vehicles, {} tasks",
        name,
        topology.num_cities(),
        vehicles.len(),
        tasks.len()
    );
    Ok(PDPInstance::new(name, topology, vehicles, tasks)?)
}

fn city(topology: &Topology, name: &str) -> anyhow::Result<CityId> {
    topology
        .city_id(name)
        .with_context(|| format!("unknown city {}", name))
}
