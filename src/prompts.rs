//! Fixed instruction templates sent to the generative model.
//!
//! There are exactly two evaluation modes and no way to supply a custom
//! instruction at runtime. Both are modelled as variants of
//! [`InstructionTemplate`] so every caller has to pick one explicitly and a
//! `match` over the two stays exhaustive.
//!
//! The texts refer to "the provided resume" and "the job description"
//! positionally: the request layout is instruction, then image, then job
//! description. See [`crate::request::EvaluationRequest::parts`].

use serde::{Deserialize, Serialize};

/// General fit assessment by a technical HR manager.
pub const GENERAL_FIT_PROMPT: &str = "You are a seasoned Technical Human Resource Manager. \
Your task is to carefully assess the provided resume against the specific job description.
Provide a detailed professional evaluation on the candidate's suitability for the role, \
clearly outlining how well their skills, experience, and qualifications align with the job requirements.
Additionally, identify both the strengths and areas for improvement in the applicant's profile \
relative to the job criteria.";

/// Percentage-match scan by an ATS.
pub const PERCENTAGE_MATCH_PROMPT: &str = "You are a highly specialized ATS (Applicant Tracking System) \
scanner with expertise in data science and ATS algorithms.
Your task is to analyze the resume in comparison to the provided job description.
First, provide a percentage match that reflects how closely the resume aligns with the job requirements.
Next, list any missing or insufficient keywords, and conclude with a brief summary of your overall \
evaluation, including any key insights or concerns about the candidate's fit for the role.";

/// Reply logged in the conversation when a question arrives before a resume.
pub const NO_RESUME_CHAT_REPLY: &str = "Please upload the resume before asking questions.";

/// Message shown when an action is requested without a resume.
pub const NO_RESUME_MESSAGE: &str = "Please upload the resume";

/// One of the two supported evaluation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionTemplate {
    /// "Tell Me About the Resume": strengths, weaknesses, overall fit.
    GeneralFit,
    /// "Percentage match": score, missing keywords, summary.
    PercentageMatch,
}

impl InstructionTemplate {
    /// Both templates, in the order the actions are presented.
    pub const ALL: [InstructionTemplate; 2] = [
        InstructionTemplate::GeneralFit,
        InstructionTemplate::PercentageMatch,
    ];

    /// The instruction text sent to the model.
    pub fn text(self) -> &'static str {
        match self {
            InstructionTemplate::GeneralFit => GENERAL_FIT_PROMPT,
            InstructionTemplate::PercentageMatch => PERCENTAGE_MATCH_PROMPT,
        }
    }

    /// Human-facing label of the action that selects this template.
    pub fn label(self) -> &'static str {
        match self {
            InstructionTemplate::GeneralFit => "Tell Me About the Resume",
            InstructionTemplate::PercentageMatch => "Percentage match",
        }
    }
}
