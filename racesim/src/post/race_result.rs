use crate::core::decision::XpGain;
use crate::core::points::points_for_finish;
use crate::error::RaceError;
use anyhow::Context;
use helpers::general::argmax;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::fs::OpenOptions;
use std::io::Write as IoWrite;
use std::path::Path;

/// RaceResults summarizes the race of the player's driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResults {
    pub driver_id: String,
    pub finish_position: u32,
    pub start_position: u32,
    /// Negative when positions were lost.
    pub positions_gained: i32,
    pub laps_led: u32,
    pub laps_completed: u32,
    pub fastest_lap: Option<f64>,
    pub average_lap: Option<f64>,
    pub clean_laps: u32,
    pub xp_gained: Vec<XpGain>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub position: u32,
    pub driver_id: String,
    pub driver_name: String,
    pub start_position: u32,
    pub laps_completed: u32,
    /// (s) Includes grid offset and pit losses
    pub total_time: f64,
    pub fastest_lap: Option<f64>,
    pub laps_led: u32,
    pub lap_times: Vec<f64>,
}

/// Classification contains the race information of the whole field that is required for
/// post-processing the results. Entries are ordered by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub track_name: String,
    pub tot_no_laps: u32,
    pub entries: Vec<ClassificationEntry>,
}

impl Classification {
    /// Driver that led the most laps, the better placed one on a tie. `None` if nobody led a lap.
    pub fn most_laps_led(&self) -> Option<&ClassificationEntry> {
        let laps_led: Vec<u32> = self.entries.iter().map(|e| e.laps_led).collect();
        if laps_led.iter().all(|&l| l == 0) {
            return None;
        }
        self.entries.get(argmax(&laps_led))
    }

    /// Championship points per entry, in classification order.
    pub fn points(&self) -> Result<Vec<(String, u32)>, RaceError> {
        let most_led_id = self.most_laps_led().map(|e| e.driver_id.as_str());

        self.entries
            .iter()
            .map(|e| {
                let points = points_for_finish(
                    e.position,
                    e.laps_led > 0,
                    most_led_id == Some(e.driver_id.as_str()),
                )?;
                Ok((e.driver_id.to_owned(), points))
            })
            .collect()
    }

    fn format_table(&self) -> Result<String, std::fmt::Error> {
        let mut content = String::new();
        writeln!(&mut content, "RESULT: {} ({} laps)", self.track_name, self.tot_no_laps)?;
        writeln!(
            &mut content,
            "pos, start, driver              , laps, total time, fastest , led"
        )?;

        for e in self.entries.iter() {
            let fastest = match e.fastest_lap {
                Some(t) => format!("{:7.3}s", t),
                None => "   -    ".to_owned(),
            };
            writeln!(
                &mut content,
                "{:3}, {:5}, {:20}, {:4}, {:9.3}s, {}, {:3}",
                e.position,
                e.start_position,
                e.driver_name,
                e.laps_completed,
                e.total_time,
                fastest,
                e.laps_led
            )?;
        }

        Ok(content)
    }

    /// print_classification prints the final classification to the console output.
    pub fn print_classification(&self) -> anyhow::Result<()> {
        let content = self.format_table().context("Failed to format classification!")?;
        print!("{}", content);
        Ok(())
    }

    /// print_lap_times prints the lap times of every car, one line per lap.
    pub fn print_lap_times(&self) -> anyhow::Result<()> {
        let mut content = String::from("lap, ");
        let header: Vec<&str> = self.entries.iter().map(|e| e.driver_id.as_str()).collect();
        writeln!(&mut content, "{}", header.join(", "))?;

        for lap in 0..self.tot_no_laps as usize {
            write!(&mut content, "{:3}", lap + 1)?;
            for e in self.entries.iter() {
                match e.lap_times.get(lap) {
                    Some(t) => write!(&mut content, ", {:8.3}s", t)?,
                    None => write!(&mut content, ",        -")?,
                }
            }
            writeln!(&mut content)?;
        }

        println!("RESULT: Lap times");
        print!("{}", content);
        Ok(())
    }

    /// write_to_file writes the classification as JSON. Parent directories are created if needed.
    pub fn write_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context(format!("Failed to create output directory {}!", parent.display()))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)
            .context(format!("Failed to open output file {}!", path.display()))?;
        serde_json::to_writer_pretty(&mut file, self)
            .context(format!("Failed to write classification to {}!", path.display()))?;
        file.flush()?;

        Ok(())
    }
}

impl RaceResults {
    pub fn print(&self) {
        println!("RESULT: {}", self.driver_id);
        println!(
            "  finished P{} from P{} ({:+} positions)",
            self.finish_position, self.start_position, self.positions_gained
        );
        println!(
            "  laps completed {}, clean {}, led {}",
            self.laps_completed, self.clean_laps, self.laps_led
        );
        if let (Some(fastest), Some(average)) = (self.fastest_lap, self.average_lap) {
            println!("  fastest lap {:.3}s, average lap {:.3}s", fastest, average);
        }
        for xp in self.xp_gained.iter() {
            println!("  +{} xp {}", xp.amount, xp.skill);
        }
    }
}
