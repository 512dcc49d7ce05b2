use crate::domain::Workout;
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("Export failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Serialize)]
struct SetRow<'a> {
    workout_id: &'a str,
    workout: &'a str,
    date: String,
    duration_secs: Option<u64>,
    exercise: &'a str,
    set: usize,
    weight: f64,
    reps: u32,
    completed: bool,
}

pub struct CsvExporter;

impl CsvExporter {
    /// Writes one row per logged set, in history order. Returns the row count.
    pub fn export_history<W: io::Write>(history: &[Workout], writer: W) -> Result<usize, ExportError> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut rows = 0;
        for workout in history {
            let date = workout.start_time.to_rfc3339();
            for exercise in &workout.exercises {
                for (index, set) in exercise.sets.iter().enumerate() {
                    wtr.serialize(SetRow {
                        workout_id: &workout.id,
                        workout: &workout.name,
                        date: date.clone(),
                        duration_secs: workout.duration,
                        exercise: &exercise.exercise_name,
                        set: index + 1,
                        weight: set.weight,
                        reps: set.reps,
                        completed: set.completed,
                    })?;
                    rows += 1;
                }
            }
        }
        wtr.flush()?;
        Ok(rows)
    }

    pub fn export_history_to_file(history: &[Workout], path: &Path) -> Result<usize, ExportError> {
        let file = File::create(path)?;
        let rows = Self::export_history(history, file)?;
        tracing::info!(path = %path.display(), rows, "exported workout history");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{WorkoutExercise, WorkoutSet};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn history() -> Vec<Workout> {
        let start = Utc.with_ymd_and_hms(2026, 1, 5, 18, 0, 0).unwrap();
        let mut squat = WorkoutExercise::new("ex2", "Squat");
        let mut first = WorkoutSet::new(100.0, 5, start);
        first.completed = true;
        squat.sets.push(first);
        squat.sets.push(WorkoutSet::new(102.5, 3, start));
        vec![Workout {
            id: "w1".to_string(),
            name: "Leg Day".to_string(),
            description: None,
            exercises: vec![squat, WorkoutExercise::new("ex8", "Leg Press")],
            start_time: start,
            end_time: Some(start),
            duration: Some(2700),
            notes: String::new(),
            program_id: None,
            user_id: "u1".to_string(),
        }]
    }

    #[test]
    fn test_export_rows() {
        let mut out = Vec::new();
        let rows = CsvExporter::export_history(&history(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(rows, 2);
        assert_eq!(lines[0], "workout_id,workout,date,duration_secs,exercise,set,weight,reps,completed");
        assert_eq!(lines[1], "w1,Leg Day,2026-01-05T18:00:00+00:00,2700,Squat,1,100.0,5,true");
        assert_eq!(lines[2], "w1,Leg Day,2026-01-05T18:00:00+00:00,2700,Squat,2,102.5,3,false");
    }

    #[test]
    fn test_export_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");
        assert_eq!(CsvExporter::export_history_to_file(&history(), &path).unwrap(), 2);
        assert!(std::fs::read_to_string(&path).unwrap().contains("Leg Day"));
    }

    #[test]
    fn test_empty_history_writes_nothing() {
        let mut out = Vec::new();
        assert_eq!(CsvExporter::export_history(&[], &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }
}
