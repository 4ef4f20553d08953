//! The unit of work sent to the model: instruction, page image, context.

use crate::model::Part;
use crate::pipeline::encode::EncodedPayload;
use crate::prompts::InstructionTemplate;

/// What the model is asked to do with the resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// One of the two fixed evaluation modes.
    Template(InstructionTemplate),
    /// A free-form chat question in place of a template.
    Question(&'a str),
}

impl Instruction<'_> {
    pub fn text(&self) -> &str {
        match self {
            Instruction::Template(t) => t.text(),
            Instruction::Question(q) => *q,
        }
    }
}

impl From<InstructionTemplate> for Instruction<'_> {
    fn from(t: InstructionTemplate) -> Self {
        Instruction::Template(t)
    }
}

/// A single evaluation request. `context` is the job description and may
/// be empty.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    pub instruction: Instruction<'a>,
    pub payload: &'a EncodedPayload,
    pub context: &'a str,
}

impl<'a> EvaluationRequest<'a> {
    pub fn new(
        instruction: impl Into<Instruction<'a>>,
        payload: &'a EncodedPayload,
        context: &'a str,
    ) -> Self {
        Self {
            instruction: instruction.into(),
            payload,
            context,
        }
    }

    /// The ordered multi-part body: instruction, image, context.
    pub fn parts(&self) -> [Part<'_>; 3] {
        [
            Part::Text(self.instruction.text()),
            Part::Image(self.payload),
            Part::Text(self.context),
        ]
    }
}
