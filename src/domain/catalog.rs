//! Read-only reference data: the exercise library and program templates.

use super::models::{RepTarget, WorkoutExercise};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Compound,
    Isolation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: &'static str,
    pub name: &'static str,
    pub muscle_groups: &'static [&'static str],
    pub equipment: &'static [&'static str],
    pub difficulty: Difficulty,
    pub category: Category,
    pub description: &'static str,
}

impl Exercise {
    /// Case-insensitive match on the name or any muscle group.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.muscle_groups.iter().any(|m| m.to_lowercase().contains(&term))
    }
}

pub const EXERCISES: [Exercise; 8] = [
    Exercise {
        id: "ex1",
        name: "Bench Press",
        muscle_groups: &["chest", "triceps"],
        equipment: &["barbell", "bench"],
        difficulty: Difficulty::Intermediate,
        category: Category::Compound,
        description: "Horizontal press targeting the pectorals, front delts and triceps.",
    },
    Exercise {
        id: "ex2",
        name: "Squat",
        muscle_groups: &["quadriceps", "glutes", "hamstrings"],
        equipment: &["barbell", "rack"],
        difficulty: Difficulty::Intermediate,
        category: Category::Compound,
        description: "Bilateral knee and hip extension under a loaded bar.",
    },
    Exercise {
        id: "ex3",
        name: "Deadlift",
        muscle_groups: &["back", "hamstrings", "glutes"],
        equipment: &["barbell"],
        difficulty: Difficulty::Advanced,
        category: Category::Compound,
        description: "Hip hinge lifting the bar from the floor, trains the posterior chain.",
    },
    Exercise {
        id: "ex4",
        name: "Pull-up",
        muscle_groups: &["back", "biceps"],
        equipment: &["pull-up bar"],
        difficulty: Difficulty::Intermediate,
        category: Category::Compound,
        description: "Vertical pull from a dead hang until the chin clears the bar.",
    },
    Exercise {
        id: "ex5",
        name: "Push-up",
        muscle_groups: &["chest", "triceps", "shoulders"],
        equipment: &[],
        difficulty: Difficulty::Beginner,
        category: Category::Compound,
        description: "Bodyweight horizontal press from a plank position.",
    },
    Exercise {
        id: "ex6",
        name: "Dumbbell Curl",
        muscle_groups: &["biceps"],
        equipment: &["dumbbells"],
        difficulty: Difficulty::Beginner,
        category: Category::Isolation,
        description: "Elbow flexion with a dumbbell in each hand.",
    },
    Exercise {
        id: "ex7",
        name: "Tricep Extension",
        muscle_groups: &["triceps"],
        equipment: &["cable machine"],
        difficulty: Difficulty::Beginner,
        category: Category::Isolation,
        description: "Elbow extension against cable resistance.",
    },
    Exercise {
        id: "ex8",
        name: "Leg Press",
        muscle_groups: &["quadriceps", "glutes"],
        equipment: &["leg press machine"],
        difficulty: Difficulty::Beginner,
        category: Category::Compound,
        description: "Machine press pushing a weighted sled away with the legs.",
    },
];

pub fn find_exercise(id: &str) -> Option<&'static Exercise> {
    EXERCISES.iter().find(|e| e.id == id)
}

pub fn search_exercises(term: &str) -> Vec<&'static Exercise> {
    EXERCISES.iter().filter(|e| e.matches(term)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramExercise {
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: u32,
    pub reps_per_set: RepTarget,
    /// Rest between sets in seconds.
    pub rest_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramWorkout {
    pub id: String,
    pub name: String,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    pub exercises: Vec<ProgramExercise>,
}

impl ProgramWorkout {
    /// Converts the planned exercises into empty workout entries carrying
    /// their targets.
    pub fn to_workout_exercises(&self) -> Vec<WorkoutExercise> {
        self.exercises
            .iter()
            .map(|planned| {
                let mut entry =
                    WorkoutExercise::new(planned.exercise_id.clone(), planned.exercise_name.clone());
                entry.target_sets = Some(planned.sets);
                entry.target_reps = Some(planned.reps_per_set.clone());
                entry.rest_time = Some(planned.rest_time);
                entry.notes = planned.notes.clone();
                entry
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    pub name: String,
    pub description: String,
    pub workouts: Vec<ProgramWorkout>,
    /// Length of the program in weeks.
    pub duration: u32,
    /// Workouts per week.
    pub frequency: u32,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub goals: Vec<String>,
}

impl Program {
    pub fn workout(&self, workout_id: &str) -> Option<&ProgramWorkout> {
        self.workouts.iter().find(|w| w.id == workout_id)
    }
}

fn planned(exercise_id: &str, sets: u32, reps: RepTarget, rest_time: u32) -> ProgramExercise {
    let exercise_name = find_exercise(exercise_id)
        .map(|e| e.name.to_string())
        .unwrap_or_else(|| exercise_id.to_string());
    ProgramExercise {
        exercise_id: exercise_id.to_string(),
        exercise_name,
        sets,
        reps_per_set: reps,
        rest_time,
        notes: None,
    }
}

fn day(id: &str, name: &str, day_of_week: u8, exercises: Vec<ProgramExercise>) -> ProgramWorkout {
    ProgramWorkout {
        id: id.to_string(),
        name: name.to_string(),
        day_of_week,
        exercises,
    }
}

/// Built-in program templates used to seed a user's program list.
pub fn program_templates() -> Vec<Program> {
    let range = |r: &str| RepTarget::Range(r.to_string());
    vec![
        Program {
            id: "template-1".to_string(),
            name: "Beginner Strength".to_string(),
            description: "A 12-week program for beginners to build strength and muscle.".to_string(),
            workouts: vec![
                day("template-1-a", "Full Body A", 1, vec![
                    planned("ex2", 3, RepTarget::Count(5), 180),
                    planned("ex1", 3, RepTarget::Count(5), 180),
                    planned("ex4", 3, range("AMRAP"), 120),
                ]),
                day("template-1-b", "Full Body B", 3, vec![
                    planned("ex3", 1, RepTarget::Count(5), 240),
                    planned("ex5", 3, range("10-15"), 90),
                    planned("ex8", 3, range("8-12"), 120),
                ]),
                day("template-1-c", "Full Body C", 5, vec![
                    planned("ex2", 3, RepTarget::Count(5), 180),
                    planned("ex6", 3, range("10-12"), 60),
                    planned("ex7", 3, range("10-12"), 60),
                ]),
            ],
            duration: 12,
            frequency: 3,
            difficulty: Difficulty::Beginner,
            goals: vec!["strength".to_string()],
        },
        Program {
            id: "template-2".to_string(),
            name: "Intermediate Hypertrophy".to_string(),
            description: "An 8-week upper/lower split focused on muscle growth.".to_string(),
            workouts: vec![
                day("template-2-upper", "Upper", 1, vec![
                    planned("ex1", 4, range("8-12"), 120),
                    planned("ex4", 4, range("8-12"), 120),
                    planned("ex6", 3, range("12-15"), 60),
                    planned("ex7", 3, range("12-15"), 60),
                ]),
                day("template-2-lower", "Lower", 2, vec![
                    planned("ex2", 4, range("8-12"), 150),
                    planned("ex8", 3, range("10-15"), 120),
                    planned("ex3", 3, range("6-8"), 180),
                ]),
            ],
            duration: 8,
            frequency: 4,
            difficulty: Difficulty::Intermediate,
            goals: vec!["hypertrophy".to_string()],
        },
        Program {
            id: "template-3".to_string(),
            name: "Advanced Powerlifting".to_string(),
            description: "A 16-week program for advanced lifters peaking the big three.".to_string(),
            workouts: vec![
                day("template-3-squat", "Squat Day", 1, vec![planned("ex2", 5, RepTarget::Count(3), 240)]),
                day("template-3-bench", "Bench Day", 3, vec![planned("ex1", 5, RepTarget::Count(3), 240)]),
                day("template-3-pull", "Deadlift Day", 5, vec![planned("ex3", 5, RepTarget::Count(2), 300)]),
            ],
            duration: 16,
            frequency: 3,
            difficulty: Difficulty::Advanced,
            goals: vec!["strength".to_string(), "powerlifting".to_string()],
        },
    ]
}
