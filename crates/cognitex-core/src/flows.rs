//! The four learning-companion flows.
//!
//! Each flow is one [`PromptContract`]; the English and Vietnamese variants
//! share schemas and differ only in template text. Contracts are built
//! explicitly through a [`FlowCatalog`] and passed to call sites.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::invoker::PromptContract;
use crate::model::{Flashcard, Locale};
use crate::schema::{Field, Schema};
use crate::template::Template;

/// Identifies one of the built-in flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    MotivationalSupport,
    FlashcardBattle,
    MoodInsights,
    MotivationScore,
}

impl FlowKind {
    pub const ALL: [FlowKind; 4] = [
        FlowKind::MotivationalSupport,
        FlowKind::FlashcardBattle,
        FlowKind::MoodInsights,
        FlowKind::MotivationScore,
    ];

    /// Stable contract name, also the key for template overrides.
    pub fn id(&self) -> &'static str {
        match self {
            FlowKind::MotivationalSupport => "provideMotivationalSupport",
            FlowKind::FlashcardBattle => "generateFlashcardBattle",
            FlowKind::MoodInsights => "provideMoodBasedInsights",
            FlowKind::MotivationScore => "calculateMotivationScore",
        }
    }

    /// Build this flow's contract for `locale`.
    pub fn contract(&self, locale: Locale) -> PromptContract {
        let (input, output) = match self {
            FlowKind::MotivationalSupport => (support_input_schema(), support_output_schema()),
            FlowKind::FlashcardBattle => (flashcard_input_schema(), flashcard_output_schema()),
            FlowKind::MoodInsights => (mood_input_schema(), mood_output_schema()),
            FlowKind::MotivationScore => (score_input_schema(), score_output_schema()),
        };
        PromptContract::new(self.id(), input, output, Template::new(template_text(*self, locale)))
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FlowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlowKind::ALL
            .into_iter()
            .find(|k| k.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown flow: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// All four contracts for one locale.
#[derive(Debug, Clone)]
pub struct FlowCatalog {
    locale: Locale,
    // Indexed by `FlowKind as usize`, in `FlowKind::ALL` order.
    contracts: [PromptContract; 4],
}

impl FlowCatalog {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            contracts: FlowKind::ALL.map(|kind| kind.contract(locale)),
        }
    }

    /// Replace template text for flows named in `overrides` (keyed by flow
    /// id). Unknown keys are ignored with a warning.
    pub fn with_template_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (key, text) in overrides {
            match key.parse::<FlowKind>() {
                Ok(kind) => {
                    let slot = &mut self.contracts[kind as usize];
                    *slot = slot.clone().with_template(Template::new(text.clone()));
                }
                Err(_) => tracing::warn!(flow = %key, "ignoring template override for unknown flow"),
            }
        }
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn get(&self, kind: FlowKind) -> &PromptContract {
        &self.contracts[kind as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FlowKind, &PromptContract)> {
        FlowKind::ALL.into_iter().zip(self.contracts.iter())
    }
}

// ---------------------------------------------------------------------------
// Motivational support
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportInput {
    pub mood: String,
    pub recent_activity: String,
    pub learning_goal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportOutput {
    pub message: String,
}

fn support_input_schema() -> Schema {
    Schema::object(vec![
        Field::new("mood", Schema::non_empty_string())
            .describe("The current mood of the student (e.g., stressed, excited, tired)."),
        Field::new("recentActivity", Schema::string()).describe(
            "A summary of the student's recent activity (e.g., long inactivity, achieved a learning milestone).",
        ),
        Field::new("learningGoal", Schema::string())
            .describe("The student's current learning goal or subject."),
    ])
}

fn support_output_schema() -> Schema {
    Schema::object(vec![Field::new("message", Schema::non_empty_string())
        .describe("A personalized motivational message for the student.")])
}

// ---------------------------------------------------------------------------
// Flashcard battle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardInput {
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardOutput {
    pub flashcards: Vec<Flashcard>,
}

fn flashcard_input_schema() -> Schema {
    Schema::object(vec![Field::new("subject", Schema::non_empty_string())
        .describe("The subject or concept for which to generate the flashcard battle.")])
}

fn flashcard_output_schema() -> Schema {
    Schema::object(vec![Field::new(
        "flashcards",
        Schema::array(Schema::object(vec![
            Field::new("question", Schema::non_empty_string())
                .describe("The question for the flashcard."),
            Field::new("answer", Schema::non_empty_string())
                .describe("The answer to the question."),
        ])),
    )
    .describe("An array of flashcards for the battle.")])
}

// ---------------------------------------------------------------------------
// Mood insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodInput {
    pub mood: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodInsights {
    pub insight: String,
    pub suggested_activity: String,
    pub motivation_state_analysis: String,
}

fn mood_input_schema() -> Schema {
    Schema::object(vec![Field::new("mood", Schema::non_empty_string())
        .describe("The student's selected mood (e.g., stressed, excited, tired).")])
}

fn mood_output_schema() -> Schema {
    Schema::object(vec![
        Field::new("insight", Schema::string())
            .describe("Insights into why the student might be feeling the selected mood."),
        Field::new("suggestedActivity", Schema::string()).describe(
            "A suggested activity based on the student's mood (e.g., challenge, relaxation game, quick study).",
        ),
        Field::new("motivationStateAnalysis", Schema::string())
            .describe("Analysis of the student's motivation state."),
    ])
}

// ---------------------------------------------------------------------------
// Motivation score
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    pub mood: String,
    /// JSON document describing streak, time spent, and skill growth.
    pub progress_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutput {
    pub motivation_score: f64,
    pub insights: String,
}

fn score_input_schema() -> Schema {
    Schema::object(vec![
        Field::new("mood", Schema::non_empty_string())
            .describe("The student's current mood (e.g., stress, excited, tired)."),
        Field::new("progressData", Schema::string()).describe(
            "A JSON document of student progress data, including streak counter, time spent learning and skill growth indicator.",
        ),
    ])
}

fn score_output_schema() -> Schema {
    Schema::object(vec![
        Field::new("motivationScore", Schema::Number)
            .describe("A numerical score representing the student's current motivation level."),
        Field::new("insights", Schema::string()).describe(
            "Insights into the motivation score, including factors that are positively or negatively influencing it.",
        ),
    ])
}

// ---------------------------------------------------------------------------
// Fallback values
// ---------------------------------------------------------------------------

/// Score shown when the motivation flow is unavailable.
pub const FALLBACK_MOTIVATION_SCORE: f64 = 78.0;

pub fn fallback_score_insight(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Keep up the great work! Your consistency is paying off.",
        Locale::Vi => "Tiếp tục phát huy nhé! Sự kiên trì của bạn đang được đền đáp.",
    }
}

pub fn fallback_support_message(locale: Locale) -> &'static str {
    match locale {
        Locale::En => {
            "I'm having a little trouble connecting right now. Please try again in a moment."
        }
        Locale::Vi => "Mình đang gặp chút trục trặc khi kết nối. Bạn thử lại sau giây lát nhé.",
    }
}

// ---------------------------------------------------------------------------
// Template text
// ---------------------------------------------------------------------------

fn template_text(kind: FlowKind, locale: Locale) -> &'static str {
    match (kind, locale) {
        (FlowKind::MotivationalSupport, Locale::En) => SUPPORT_EN,
        (FlowKind::MotivationalSupport, Locale::Vi) => SUPPORT_VI,
        (FlowKind::FlashcardBattle, Locale::En) => FLASHCARDS_EN,
        (FlowKind::FlashcardBattle, Locale::Vi) => FLASHCARDS_VI,
        (FlowKind::MoodInsights, Locale::En) => MOOD_EN,
        (FlowKind::MoodInsights, Locale::Vi) => MOOD_VI,
        (FlowKind::MotivationScore, Locale::En) => SCORE_EN,
        (FlowKind::MotivationScore, Locale::Vi) => SCORE_VI,
    }
}

const SUPPORT_EN: &str = "You are a motivational AI assistant named Cogni, designed to encourage students on their learning journey.

The student is feeling {{mood}} and their recent activity is: {{recentActivity}}.
They are currently working towards the learning goal: {{learningGoal}}.

Write a short, personalized motivational message (1-2 sentences at most) that encourages the student and offers support.
Focus on their specific situation and learning goal.";

const SUPPORT_VI: &str = "Bạn là một trợ lý AI tạo động lực tên là Cogni, được thiết kế để khuyến khích học sinh trong hành trình học tập của họ.

Học sinh đang cảm thấy {{mood}} và hoạt động gần đây của họ là: {{recentActivity}}.
Họ hiện đang làm việc với mục tiêu học tập: {{learningGoal}}.

Tạo một thông điệp tạo động lực ngắn gọn, được cá nhân hóa (tối đa 1-2 câu) để khuyến khích học sinh và cung cấp hỗ trợ.
Tập trung vào tình hình cụ thể và mục tiêu học tập của họ.";

const FLASHCARDS_EN: &str = "You are an AI that creates flashcard battle games for students.

The student provides a subject or concept, and you create a set of flashcards with questions and answers about it.

Subject/Concept: {{{subject}}}

Create a set of flashcards (at least 5 cards) that can be used in a flashcard battle game. Each card must have a question and a matching answer.
The flashcards should be varied and cover different aspects of the subject.
Keep answers short so they can be typed exactly.
Make sure the \"question\" and \"answer\" fields are never empty.
Do not include any explanation or extra context beyond the flashcards themselves.";

const FLASHCARDS_VI: &str = "Bạn là một AI tạo ra các trò chơi chiến đấu bằng thẻ flashcard cho học sinh.

Học sinh sẽ cung cấp một chủ đề hoặc khái niệm, và bạn sẽ tạo ra một bộ thẻ flashcard với các câu hỏi và câu trả lời liên quan đến chủ đề đó.

Chủ đề/Khái niệm: {{{subject}}}

Tạo một bộ thẻ flashcard (ít nhất 5 thẻ) có thể được sử dụng trong một trò chơi chiến đấu bằng thẻ flashcard. Mỗi thẻ nên có một câu hỏi và câu trả lời tương ứng.
Các thẻ flashcard phải đa dạng và bao gồm các khía cạnh khác nhau của chủ đề.
Đảm bảo rằng các trường \"question\" và \"answer\" không trống.
Không bao gồm bất kỳ giải thích hoặc ngữ cảnh bổ sung nào ngoài chính các thẻ flashcard.";

const MOOD_EN: &str = "You are a supportive AI study companion who helps students understand their mood and offers helpful suggestions.

Based on the student's mood, give insight into why they might be feeling this way. Also suggest an activity that fits their current mood and give a brief analysis of their motivation state.

Mood: {{{mood}}}";

const MOOD_VI: &str = "Bạn là một người bạn đồng hành học tập AI luôn hỗ trợ, giúp học sinh hiểu tâm trạng của mình và đưa ra những gợi ý hữu ích.

Dựa trên tâm trạng của học sinh, hãy cung cấp thông tin chi tiết về lý do tại sao họ có thể cảm thấy như vậy. Đồng thời, đề xuất một hoạt động phù hợp với tâm trạng hiện tại của họ và thực hiện một phân tích ngắn gọn về trạng thái động lực.

Tâm trạng: {{{mood}}}";

const SCORE_EN: &str = "You are an AI motivation expert. Your task is to calculate a motivation score for a student based on their mood and progress data.

Mood: {{{mood}}}
Progress data: {{{progressData}}}

Consider the mood and the progress data when calculating the score. A positive mood and good progress give a higher score. A negative mood and poor progress give a lower score.

Provide insights into the score, explaining which factors contribute positively or negatively to it.";

const SCORE_VI: &str = "Bạn là một chuyên gia về động lực AI. Nhiệm vụ của bạn là tính toán điểm động lực cho một học sinh dựa trên tâm trạng và dữ liệu tiến độ của họ.

Tâm trạng: {{{mood}}}
Dữ liệu tiến độ: {{{progressData}}}

Hãy xem xét tâm trạng và dữ liệu tiến độ để tính điểm động lực. Một tâm trạng tích cực và tiến độ tốt sẽ cho điểm cao hơn. Một tâm trạng tiêu cực và tiến độ kém sẽ cho điểm thấp hơn.

Cung cấp thông tin chi tiết về điểm động lực, giải thích yếu tố nào đang góp phần tích cực hoặc tiêu cực vào điểm số.";
