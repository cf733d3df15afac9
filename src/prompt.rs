use crate::provider::ContentPart;
use crate::types::{ImageData, Mode, ToneSelection};
use serde_json::{Value, json};

const MEDIA_ANALYSIS_INSTRUCTION: &str =
    "MEDIA ANALYSIS: Identify the Partner's last message. Use previous messages only for context.";

const IMAGE_ONLY_SUBSTITUTE: &str = "Analyze the image";

/// Mode-, tone- and iteration-specific guidance for the model
pub fn tone_instruction(mode: Mode, tone: ToneSelection, iteration: u32) -> String {
    if mode == Mode::Search {
        return "You are a world-class Dating Concierge and Event Planner. \
            Your goal is to create IMPRESSIVE, SPECIFIC date ideas based on the user's request. \
            Use Google Search to find real, currently open places or events if location is implied."
            .to_string();
    }

    let mut instruction = if iteration == 0 {
        String::from(
            "Provide 3 initial options: 1. Casual/Low-key (safe), 2. Playful (medium risk), \
            3. Direct (higher risk). Keep them short.",
        )
    } else {
        String::from(
            "The user wants MORE options. Go deeper, wittier, or more specific. \
            Increase the 'Rizz' level. Give 3 new unique options.",
        )
    };

    if let ToneSelection::Specific(tone) = tone {
        instruction.push_str(&format!(" Focus specifically on the {tone} vibe."));
    }

    instruction
}

/// Builds the system instruction for one mode/tone/iteration combination
pub fn create_system_instruction(mode: Mode, tone: ToneSelection, iteration: u32) -> String {
    let mode_label = if mode == Mode::Search {
        "DATE PLANNER / FACT CHECKER"
    } else {
        "RIZZ GENERATOR"
    };

    format!(
        "You are 'RizzMaster'.

CRITICAL INSTRUCTION - SMART HANDLING:
1. **Scenario Detection**: If the user says \"She said X but I am Y\" (e.g., \"She wants to meet but I'm busy\"), your replies MUST solve the problem.
2. **Simple Starts**: If the input is just \"hey\", DO NOT over-analyze. Give chill, short replies.

MODE: {mode_label}
{tone}

OUTPUT FORMAT:
You must output strictly compatible JSON matching the schema.
For Date Plans (Search Mode):
- 'tone': Use this field for the \"Title\" of the date idea (e.g., \"Sunset Drinks @ The Roof\").
- 'reply': Use this field for the \"Details\" (Time, Activity, Logistics). Format nicely with line breaks if needed.
- 'explanation': Why this date works.",
        tone = tone_instruction(mode, tone, iteration),
    )
}

/// Ordered content parts: image and its instruction first, then the user text
pub fn build_parts(prompt_text: &str, image: Option<&ImageData>) -> Vec<ContentPart> {
    let mut parts = Vec::with_capacity(3);

    if let Some(image) = image {
        parts.push(ContentPart::InlineImage(image.clone()));
        parts.push(ContentPart::Text(MEDIA_ANALYSIS_INSTRUCTION.to_string()));
    }

    let input = if prompt_text.is_empty() {
        IMAGE_ONLY_SUBSTITUTE
    } else {
        prompt_text
    };
    parts.push(ContentPart::Text(format!("User Input: {input}.")));

    parts
}

/// Response schema for an analysis result, in the provider's schema dialect
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "Very brief context summary (1 sentence)."
            },
            "suggestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "tone": {
                            "type": "STRING",
                            "description": "The tone (e.g., Casual, Flirty) or Title of the Plan"
                        },
                        "reply": {
                            "type": "STRING",
                            "description": "The suggested reply text or Date Plan Details."
                        },
                        "explanation": {
                            "type": "STRING",
                            "description": "Short reason why."
                        }
                    },
                    "required": ["tone", "reply", "explanation"]
                }
            }
        },
        "required": ["summary", "suggestions"]
    })
}
