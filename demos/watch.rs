use ants_colony::{render, Simulation, SimulationConfig};
use std::env;
use std::fs;
use std::io::stdout;
use std::thread;
use std::time::Duration;

fn main() {
    // Optional JSON config as the first argument, seed as the second
    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => {
            let contents = match fs::read_to_string(path) {
                Ok(contents) => contents,
                Err(e) => panic!("Error reading config file: {}", e),
            };
            match SimulationConfig::from_json(&contents) {
                Ok(config) => config,
                Err(e) => panic!("Invalid config: {}", e),
            }
        }
        None => SimulationConfig {
            width: 60,
            height: 30,
            ant_count: 40,
            duration: 2000,
            food_spawn_chance: 0.001,
            food_required_to_lay_egg: 20.0,
            egg_gestation_period: 50,
            ..SimulationConfig::default()
        },
    };
    let seed = args.get(2).and_then(|seed| seed.parse().ok()).unwrap_or(0);

    let mut simulation = match Simulation::new(config, seed) {
        Ok(simulation) => simulation.with_replay("/tmp/ants_colony_replay.json".to_string()),
        Err(e) => panic!("Invalid config: {}", e),
    };

    let mut stdout = stdout();
    while simulation.tick() < simulation.config().duration {
        simulation.step();
        render::draw(&mut stdout, &simulation.snapshot(), simulation.config()).unwrap();
        thread::sleep(Duration::from_millis(30));
    }

    simulation.save_replay().unwrap();
    println!("\nFinished: {:?}", simulation.stats());
}
