use crate::config::SimulationConfig;
use crate::entities::AntMode;
use crate::simulation::Snapshot;
use crossterm::{
    cursor::{Hide, MoveTo},
    queue,
    style::{Color, Print, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::Write;

#[derive(Clone, Copy)]
struct Cell {
    char: char,
    color: Color,
}

const EMPTY: Cell = Cell {
    char: '.',
    color: Color::Reset,
};

/// How strongly a cell's pheromone is drawn, between 0 and `pheromone_max_opacity`.
pub fn pheromone_opacity(intensity: f64, config: &SimulationConfig) -> f64 {
    let opacity =
        intensity / config.pheromone_initial_intensity * config.pheromone_max_opacity;
    opacity.clamp(0.0, config.pheromone_max_opacity)
}

/// Writes a coloured character view of `snapshot` to `out`.
pub fn draw<W: Write>(
    out: &mut W,
    snapshot: &Snapshot,
    config: &SimulationConfig,
) -> std::io::Result<()> {
    let returning = snapshot
        .ants
        .iter()
        .filter(|ant| ant.mode == AntMode::Returning)
        .count();

    // Display information about the colony
    queue!(
        out,
        Clear(ClearType::All),
        MoveTo(0, 0),
        Hide,
        Print(format!("Tick: {}", snapshot.tick)),
        Print(format!(
            "\nAnts: {} ({} returning)",
            snapshot.ants.len(),
            returning
        )),
        Print(format!("\nEggs: {}", snapshot.pending_eggs)),
        Print(format!("\nStore: {:.1}\n\n", snapshot.food_store)),
    )?;

    // Later layers are drawn over earlier ones
    let mut cells = vec![EMPTY; snapshot.width * snapshot.height];
    let index = |(x, y): (usize, usize)| y * snapshot.width + x;

    for &(position, intensity) in &snapshot.pheromone {
        let shade = pheromone_opacity(intensity, config) / config.pheromone_max_opacity;
        cells[index(position)] = Cell {
            char: if shade > 0.5 { ':' } else { ',' },
            color: Color::Rgb {
                r: 0,
                g: (80.0 + 175.0 * shade) as u8,
                b: 0,
            },
        };
    }
    for &(position, _) in &snapshot.food {
        cells[index(position)] = Cell {
            char: '*',
            color: Color::Yellow,
        };
    }
    for ant in &snapshot.ants {
        cells[index(ant.position)] = match ant.mode {
            AntMode::Exploring => Cell {
                char: 'a',
                color: Color::White,
            },
            AntMode::Returning => Cell {
                char: 'A',
                color: Color::Red,
            },
        };
    }
    cells[index(snapshot.queen)] = Cell {
        char: 'Q',
        color: Color::Magenta,
    };

    for row in cells.chunks(snapshot.width) {
        for cell in row {
            queue!(
                out,
                SetForegroundColor(cell.color),
                Print(cell.char),
                SetForegroundColor(Color::Reset)
            )?;
        }
        queue!(out, Print("\n"))?;
    }

    out.flush()
}
