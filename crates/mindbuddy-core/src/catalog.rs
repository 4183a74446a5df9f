//! Static content catalog
//!
//! The fixed set of daily tasks, learning modules, quiz questions, and
//! food items. Supplied as configuration at session start; the core
//! never computes content, it only enforces the rules around it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What kind of daily task this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Lesson,
    Reflection,
    Activity,
    Social,
}

/// A daily wellness task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward_xp: u32,
    pub category: TaskCategory,
    /// Starting completion flag (some catalogs ship with work already done)
    #[serde(default)]
    pub completed: bool,
}

/// Food store category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    Snack,
    Meal,
    Treat,
    Special,
}

/// A purchasable food item for the virtual pet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Price in XP
    pub price: u32,
    /// Happiness gained per feeding, clamped at the happiness cap
    pub happiness_boost: u8,
    pub category: FoodCategory,
}

/// How a lesson is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    Video,
    Article,
    Quiz,
    Activity,
}

/// A single lesson within a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSpec {
    pub id: String,
    pub title: String,
    pub reward_xp: u32,
    pub kind: LessonKind,
    /// Starting lock flag; the unlock policy itself is content-defined
    #[serde(default)]
    pub locked: bool,
    /// Starting completion flag
    #[serde(default)]
    pub completed: bool,
}

/// An ordered group of lessons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub id: String,
    pub title: String,
    pub lessons: Vec<LessonSpec>,
}

/// One multiple-choice quiz question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

/// The complete static content configuration for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub tasks: Vec<Task>,
    pub modules: Vec<ModuleSpec>,
    /// Quiz questions per quiz-kind lesson id
    pub quizzes: BTreeMap<String, Vec<QuizQuestion>>,
    pub food: Vec<FoodItem>,
}

impl Catalog {
    /// Load a catalog from JSON configuration
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a food item by id
    pub fn food_item(&self, id: &str) -> Option<&FoodItem> {
        self.food.iter().find(|f| f.id == id)
    }

    /// Look up a task by id
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Look up a lesson by id across all modules
    pub fn lesson(&self, id: &str) -> Option<&LessonSpec> {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .find(|l| l.id == id)
    }
}

fn task(id: &str, title: &str, description: &str, reward_xp: u32, category: TaskCategory, completed: bool) -> Task {
    Task {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        reward_xp,
        category,
        completed,
    }
}

fn lesson(id: &str, title: &str, reward_xp: u32, kind: LessonKind, locked: bool, completed: bool) -> LessonSpec {
    LessonSpec {
        id: id.into(),
        title: title.into(),
        reward_xp,
        kind,
        locked,
        completed,
    }
}

fn food(id: &str, name: &str, description: &str, price: u32, happiness_boost: u8, category: FoodCategory) -> FoodItem {
    FoodItem {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        price,
        happiness_boost,
        category,
    }
}

impl Default for Catalog {
    /// The built-in wellness content: four daily tasks, three learning
    /// modules, one knowledge-check quiz, and the pet food store.
    fn default() -> Self {
        let tasks = vec![
            task("t1", "Complete morning reflection", "Take 5 minutes to journal your thoughts", 15, TaskCategory::Reflection, true),
            task("t2", "Watch: Managing Stress", "A 3-minute video on coping techniques", 20, TaskCategory::Lesson, false),
            task("t3", "Practice deep breathing", "5 cycles of 4-7-8 breathing", 10, TaskCategory::Activity, false),
            task("t4", "Send a gratitude message", "Share appreciation with someone", 15, TaskCategory::Social, false),
        ];

        let modules = vec![
            ModuleSpec {
                id: "mod1".into(),
                title: "Understanding Anxiety".into(),
                lessons: vec![
                    lesson("l1", "What is Anxiety?", 20, LessonKind::Video, false, true),
                    lesson("l2", "Common Triggers", 15, LessonKind::Article, false, true),
                    lesson("l3", "Knowledge Check", 25, LessonKind::Quiz, false, false),
                    lesson("l4", "Grounding Exercise", 20, LessonKind::Activity, true, false),
                ],
            },
            ModuleSpec {
                id: "mod2".into(),
                title: "Building Resilience".into(),
                lessons: vec![
                    lesson("l5", "The Resilience Mindset", 20, LessonKind::Video, false, true),
                    lesson("l6", "Growth Through Challenges", 15, LessonKind::Article, false, false),
                    lesson("l7", "Self-Compassion Practice", 25, LessonKind::Activity, true, false),
                ],
            },
            ModuleSpec {
                id: "mod3".into(),
                title: "Peer Support Skills".into(),
                lessons: vec![
                    lesson("l8", "Active Listening", 20, LessonKind::Video, false, false),
                    lesson("l9", "Setting Boundaries", 15, LessonKind::Article, true, false),
                ],
            },
        ];

        let mut quizzes = BTreeMap::new();
        quizzes.insert(
            "l3".to_string(),
            vec![
                QuizQuestion {
                    id: "q1".into(),
                    prompt: "Which of the following is a common physical symptom of anxiety?".into(),
                    options: vec![
                        "Increased appetite".into(),
                        "Rapid heartbeat".into(),
                        "Improved sleep".into(),
                        "Enhanced focus".into(),
                    ],
                    correct_index: 1,
                },
                QuizQuestion {
                    id: "q2".into(),
                    prompt: "What is the 5-4-3-2-1 grounding technique?".into(),
                    options: vec![
                        "A breathing exercise".into(),
                        "A meditation practice".into(),
                        "A sensory awareness technique".into(),
                        "A journaling method".into(),
                    ],
                    correct_index: 2,
                },
                QuizQuestion {
                    id: "q3".into(),
                    prompt: "Which approach is most helpful when supporting someone with anxiety?".into(),
                    options: vec![
                        "Tell them to calm down".into(),
                        "Share statistics about anxiety".into(),
                        "Listen without judgment".into(),
                        "Change the subject".into(),
                    ],
                    correct_index: 2,
                },
            ],
        );

        let food_items = vec![
            food("apple", "Fresh Apple", "A crisp, healthy snack", 15, 5, FoodCategory::Snack),
            food("carrot", "Crunchy Carrot", "Packed with vitamins", 10, 3, FoodCategory::Snack),
            food("salad", "Garden Salad", "A refreshing mixed salad", 25, 8, FoodCategory::Meal),
            food("smoothie", "Berry Smoothie", "Blended with love", 30, 10, FoodCategory::Meal),
            food("cookie", "Oat Cookie", "A sweet, wholesome treat", 20, 7, FoodCategory::Treat),
            food("cake", "Celebration Cake", "For special moments", 50, 15, FoodCategory::Special),
            food("sushi", "Veggie Sushi", "A fancy, balanced meal", 40, 12, FoodCategory::Meal),
            food("star-fruit", "Star Fruit", "Rare and magical", 75, 20, FoodCategory::Special),
        ];

        Self {
            tasks,
            modules,
            quizzes,
            food: food_items,
        }
    }
}
