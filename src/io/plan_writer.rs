use std::fs::File;
use std::io::{BufWriter, Write};

use serde::Serialize;

use crate::plan::Plan;
use crate::problem::pdp::PDPInstance;
use crate::problem::Num;
use crate::solver::PlanningOutcome;

/**
Plain-text layout of the plan files, modelled on SINTEF solution files:

Instance name:    triangle
Seed:             42
Distance:         47
Cost:             235
Vehicle 1 : pickup(1) move(B) deliver(1) move(A) pickup(3) move(C) deliver(3)
Vehicle 2 : move(B) pickup(2) move(C) deliver(2)

Idle vehicles are listed with an empty action list.
 */
#[derive(Debug, Serialize)]
pub struct PlanFile {
    pub instance_name: String,
    pub seed: Option<i128>,
    pub distance: Num,
    pub cost: Num,
    pub iterations: usize,
    pub plans: Vec<Plan>,
    #[serde(skip)]
    pub described_actions: Vec<Vec<String>>,
}

pub struct PlanFileBuilder {
    pub instance_name: Option<String>,
    pub seed: Option<i128>,
    pub distance: Num,
    pub cost: Num,
    pub iterations: usize,
    pub plans: Vec<Plan>,
    pub described_actions: Vec<Vec<String>>,
}

impl PlanFileBuilder {
    pub fn new() -> Self {
        Self {
            instance_name: None,
            seed: None,
            distance: 0.0,
            cost: 0.0,
            iterations: 0,
            plans: vec![],
            described_actions: vec![],
        }
    }
    pub fn instance_name(&mut self, instance_name: impl Into<String>) -> &mut Self {
        self.instance_name = Some(instance_name.into());
        self
    }
    pub fn seed(&mut self, seed: i128) -> &mut Self {
        self.seed = Some(seed);
        self
    }
    pub fn plans_from_outcome(
        &mut self,
        outcome: &PlanningOutcome,
        instance: &PDPInstance,
    ) -> &mut Self {
        self.distance = outcome.total_distance(instance);
        self.cost = outcome.total_cost(instance);
        self.iterations = outcome.iterations();
        self.plans = outcome.plans.clone();
        self.described_actions = outcome
            .plans
            .iter()
            .map(|plan| {
                plan.actions
                    .iter()
                    .map(|action| action.describe(&instance.topology))
                    .collect()
            })
            .collect();
        self
    }
    pub fn build(&mut self) -> PlanFile {
        PlanFile {
            instance_name: self
                .instance_name
                .take()
                .unwrap_or("UNKNOWN".to_string()),
            seed: self.seed,
            distance: self.distance,
            cost: self.cost,
            iterations: self.iterations,
            plans: std::mem::take(&mut self.plans),
            described_actions: std::mem::take(&mut self.described_actions),
        }
    }
}

impl Default for PlanFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn write_plans(writer: &mut impl Write, plan_file: &PlanFile) -> anyhow::Result<()> {
    writeln!(writer, "Instance name:    {}", plan_file.instance_name)?;
    if let Some(seed) = plan_file.seed {
        writeln!(writer, "Seed:             {}", seed)?;
    }
    writeln!(writer, "Distance:         {}", plan_file.distance)?;
    writeln!(writer, "Cost:             {}", plan_file.cost)?;

    for (plan, actions) in plan_file
        .plans
        .iter()
        .zip(plan_file.described_actions.iter())
    {
        write!(writer, "Vehicle {} :", plan.vehicle)?;
        for action in actions {
            write!(writer, " {}", action)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn write_plan_file(path: impl Into<String>, plan_file: &PlanFile) -> anyhow::Result<()> {
    let f = File::create(path.into())?;
    let mut file = BufWriter::new(&f);
    write_plans(&mut file, plan_file)?;
    file.flush()?;
    Ok(())
}

pub fn write_json_plan_file(path: impl Into<String>, plan_file: &PlanFile) -> anyhow::Result<()> {
    let f = File::create(path.into())?;
    let mut file = BufWriter::new(&f);
    serde_json::to_writer_pretty(&mut file, plan_file)?;
    file.flush()?;
    Ok(())
}
