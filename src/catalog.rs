//! Bundled reference data: the Spark prompt catalog and the date-idea deck

use tracing::warn;

use crate::models::{Idea, IdeaCategory, IdeaTier, SparkCategory};

/// The full prompt catalog, in the order chapters and prompts are presented.
///
/// Seeding projects this list one-to-one into per-user checklist items, so
/// reordering entries changes the on-screen order for new users only.
pub const SPARK_CATALOG: &[(SparkCategory, &str)] = &[
    (SparkCategory::FirstSteps, "Plan a surprise coffee date this week"),
    (SparkCategory::FirstSteps, "Write down three things you appreciate about your partner"),
    (SparkCategory::FirstSteps, "Put both of your phones away for an entire dinner"),
    (SparkCategory::FirstSteps, "Recreate your very first date"),
    (SparkCategory::FirstSteps, "Cook a new recipe together"),
    (SparkCategory::FirstSteps, "Take a sunset walk with no destination"),
    (SparkCategory::FirstSteps, "Ask about the best part of their day, and really listen"),
    (SparkCategory::FirstSteps, "Leave a note where they'll find it tomorrow"),
    (SparkCategory::FirstSteps, "Pick a song that is officially yours"),
    (SparkCategory::FirstSteps, "Plan next weekend together, out loud"),
    (SparkCategory::DeeperTalks, "Share a childhood memory you've never told them"),
    (SparkCategory::DeeperTalks, "Ask what they dreamed of being at age ten"),
    (SparkCategory::DeeperTalks, "Talk about the moment you knew this was real"),
    (SparkCategory::DeeperTalks, "Swap one fear and one hope for the next year"),
    (SparkCategory::DeeperTalks, "Ask what makes them feel most loved"),
    (SparkCategory::DeeperTalks, "Tell them about a time they made you proud"),
    (SparkCategory::DeeperTalks, "Describe a place you'd both move to tomorrow"),
    (SparkCategory::DeeperTalks, "Ask which habit of yours they secretly love"),
    (SparkCategory::DeeperTalks, "Share something you find hard to say out loud"),
    (SparkCategory::DeeperTalks, "Ask what they need more of from you"),
    (SparkCategory::SharedAdventures, "Take a day trip somewhere neither of you has been"),
    (SparkCategory::SharedAdventures, "Try a sport neither of you can play"),
    (SparkCategory::SharedAdventures, "Get lost in a new neighborhood on purpose"),
    (SparkCategory::SharedAdventures, "Watch a sunrise from somewhere high"),
    (SparkCategory::SharedAdventures, "Plan a trip using only a paper map"),
    (SparkCategory::SharedAdventures, "Go stargazing away from the city lights"),
    (SparkCategory::SharedAdventures, "Take a class together, any class"),
    (SparkCategory::SharedAdventures, "Camp out, even if it's the living room"),
    (SparkCategory::SharedAdventures, "Swim somewhere wild"),
    (SparkCategory::SharedAdventures, "Say yes to the next invitation you'd normally skip"),
    (SparkCategory::ThoughtfulGestures, "Bring home their favorite snack unprompted"),
    (SparkCategory::ThoughtfulGestures, "Do the chore they dread before they notice"),
    (SparkCategory::ThoughtfulGestures, "Send a photo that reminds you of them"),
    (SparkCategory::ThoughtfulGestures, "Frame a picture from a day you both loved"),
    (SparkCategory::ThoughtfulGestures, "Learn to make their favorite drink"),
    (SparkCategory::ThoughtfulGestures, "Mail them an actual letter"),
    (SparkCategory::ThoughtfulGestures, "Plan an evening around their current obsession"),
    (SparkCategory::ThoughtfulGestures, "Stock the fridge before a hard week"),
    (SparkCategory::ThoughtfulGestures, "Compliment them in front of someone else"),
    (SparkCategory::ThoughtfulGestures, "Remember the small thing they mentioned on Tuesday"),
    (SparkCategory::KeepingTheFlame, "Book a night away with no agenda"),
    (SparkCategory::KeepingTheFlame, "Dress up for dinner at home"),
    (SparkCategory::KeepingTheFlame, "Share three things that first attracted you"),
    (SparkCategory::KeepingTheFlame, "Plan a date like you're trying to win them over"),
    (SparkCategory::KeepingTheFlame, "Slow dance in the kitchen"),
    (SparkCategory::KeepingTheFlame, "Write them a letter to open next year"),
    (SparkCategory::KeepingTheFlame, "Revisit the place where it all started"),
    (SparkCategory::KeepingTheFlame, "Turn an ordinary Tuesday into an anniversary"),
    (SparkCategory::KeepingTheFlame, "Make a bucket list for the two of you"),
    (SparkCategory::KeepingTheFlame, "Tell them why you'd choose them again"),
];

const BUNDLED_IDEAS: &str = include_str!("../assets/ideas.json");

/// Parse the bundled idea deck, falling back to a small built-in sample so
/// the feed is never empty.
pub fn bundled_ideas() -> Vec<Idea> {
    match serde_json::from_str::<Vec<Idea>>(BUNDLED_IDEAS) {
        Ok(ideas) if !ideas.is_empty() => ideas,
        Ok(_) => {
            warn!("bundled idea catalog is empty, using the fallback sample");
            fallback_ideas()
        }
        Err(err) => {
            warn!("failed to parse the bundled idea catalog: {err}");
            fallback_ideas()
        }
    }
}

/// The compiled-in sample used when the bundled catalog cannot be read
pub fn fallback_ideas() -> Vec<Idea> {
    vec![
        Idea {
            id: "fallback-picnic".to_string(),
            title: "Golden-hour picnic".to_string(),
            description: "Pack whatever is already in the kitchen and find a spot facing west."
                .to_string(),
            category: IdeaCategory::Outdoor,
            difficulty: 1,
            impressiveness: 2,
            image: None,
            tier: IdeaTier::Free,
        },
        Idea {
            id: "fallback-questions".to_string(),
            title: "Twenty questions, grown-up edition".to_string(),
            description: "Take turns asking questions you somehow never asked each other."
                .to_string(),
            category: IdeaCategory::AtHome,
            difficulty: 1,
            impressiveness: 2,
            image: None,
            tier: IdeaTier::Free,
        },
        Idea {
            id: "fallback-dessert-crawl".to_string(),
            title: "Dessert crawl".to_string(),
            description: "Three stops, one dessert each, walk between all of them.".to_string(),
            category: IdeaCategory::Food,
            difficulty: 2,
            impressiveness: 3,
            image: None,
            tier: IdeaTier::Free,
        },
    ]
}
