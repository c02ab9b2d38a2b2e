use std::fmt;

use serde::Serialize;

/// What a headless run produced, printed once the last frame is stepped.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub effect: &'static str,
    pub frames: u64,
    pub viewport: String,
    pub seed: u64,
    pub simulated_seconds: f32,
    pub commands: usize,
    pub draw_calls: usize,
    pub details: EffectDetails,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectDetails {
    Fall {
        mesh_width: usize,
        mesh_height: usize,
        leaves: usize,
        drops: u64,
        landings: u64,
        ripple_energy: u64,
    },
    Galaxy {
        stars: usize,
        layout: String,
        vertices: usize,
        x_offset: f32,
        preview: bool,
        mean_angle_advance: f32,
    },
}

impl RunSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Effect:     {}", self.effect)?;
        writeln!(f, "Frames:     {}", self.frames)?;
        writeln!(f, "Viewport:   {}", self.viewport)?;
        writeln!(f, "Seed:       {}", self.seed)?;
        writeln!(f, "Simulated:  {:.3}s", self.simulated_seconds)?;
        writeln!(
            f,
            "Commands:   {} ({} draw calls)",
            self.commands, self.draw_calls
        )?;
        match &self.details {
            EffectDetails::Fall {
                mesh_width,
                mesh_height,
                leaves,
                drops,
                landings,
                ripple_energy,
            } => {
                writeln!(f, "Mesh:       {mesh_width}x{mesh_height}")?;
                writeln!(f, "Leaves:     {leaves} ({landings} landed)")?;
                writeln!(f, "Drops:      {drops}")?;
                write!(f, "Energy:     {ripple_energy}")
            }
            EffectDetails::Galaxy {
                stars,
                layout,
                vertices,
                x_offset,
                preview,
                mean_angle_advance,
            } => {
                writeln!(f, "Stars:      {stars} as {layout} ({vertices} vertices)")?;
                writeln!(f, "Offset:     {x_offset:.3}")?;
                writeln!(f, "Preview:    {}", if *preview { "on" } else { "off" })?;
                write!(f, "Rotation:   {mean_angle_advance:.4} rad mean")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fall_summary() -> RunSummary {
        RunSummary {
            effect: "fall",
            frames: 3,
            viewport: "100x200".into(),
            seed: 1,
            simulated_seconds: 0.048,
            commands: 90,
            draw_calls: 27,
            details: EffectDetails::Fall {
                mesh_width: 16,
                mesh_height: 32,
                leaves: 6,
                drops: 1,
                landings: 0,
                ripple_energy: 1234,
            },
        }
    }

    #[test]
    fn json_nests_effect_details() {
        let json: serde_json::Value =
            serde_json::from_str(&fall_summary().to_json().unwrap()).unwrap();
        assert_eq!(json["effect"], "fall");
        assert_eq!(json["details"]["fall"]["ripple_energy"], 1234);
        assert_eq!(json["details"]["fall"]["mesh_height"], 32);
    }

    #[test]
    fn human_output_lists_counts() {
        let text = fall_summary().to_string();
        assert!(text.contains("Mesh:       16x32"));
        assert!(text.contains("Drops:      1"));
        assert!(text.contains("90 (27 draw calls)"));
    }
}
