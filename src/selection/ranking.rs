use crate::document::Chunk;
use crate::types::context_bundle::ScoreDetails;

pub const TYPE_DEFINITION_WEIGHT: u32 = 100;
pub const FUNCTION_DEFINITION_WEIGHT: u32 = 50;
pub const IMPORT_WEIGHT: u32 = 30;
pub const ENTRY_POINT_WEIGHT: u32 = 20;
pub const MAX_DENSITY_BONUS: u32 = 10;

const TYPE_MARKERS: &[&str] = &["class ", "struct ", "enum ", "interface ", "trait "];
const FUNCTION_MARKERS: &[&str] = &["def ", "fn ", "function ", "func "];
const IMPORT_MARKERS: &[&str] = &["import ", "from ", "#include", "use ", "require("];
const ENTRY_POINT_MARKERS: &[&str] = &[
    "if __name__",
    "fn main(",
    "int main(",
    "func main(",
    "static void main(",
];

pub trait Scorer {
    fn score(&self, chunk: &Chunk) -> ScoreDetails;

    fn score_value(&self, details: &ScoreDetails) -> u32 {
        let mut score = 0;
        if details.type_definition {
            score += TYPE_DEFINITION_WEIGHT;
        }
        if details.function_definition {
            score += FUNCTION_DEFINITION_WEIGHT;
        }
        if details.imports {
            score += IMPORT_WEIGHT;
        }
        if details.entry_point {
            score += ENTRY_POINT_WEIGHT;
        }
        debug_assert!(details.density_bonus <= MAX_DENSITY_BONUS);
        score + details.density_bonus
    }
}

/// Substring markers over lowercased content. No parsing, on purpose: a
/// marker inside a comment or string counts the same as real code.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalPriorityScorer;

impl Scorer for LexicalPriorityScorer {
    fn score(&self, chunk: &Chunk) -> ScoreDetails {
        let content = chunk.content.to_lowercase();
        let contains_any = |markers: &[&str]| markers.iter().any(|m| content.contains(m));

        ScoreDetails {
            type_definition: contains_any(TYPE_MARKERS),
            function_definition: contains_any(FUNCTION_MARKERS),
            imports: contains_any(IMPORT_MARKERS),
            entry_point: contains_any(ENTRY_POINT_MARKERS),
            density_bonus: density_bonus(&content),
        }
    }
}

/// `floor(non_blank_lines / lines * 10)`
fn density_bonus(content: &str) -> u32 {
    let mut lines = 0u32;
    let mut non_blank = 0u32;
    for line in content.split('\n') {
        lines += 1;
        if !line.trim().is_empty() {
            non_blank += 1;
        }
    }

    // split always yields at least one line
    non_blank * MAX_DENSITY_BONUS / lines
}
