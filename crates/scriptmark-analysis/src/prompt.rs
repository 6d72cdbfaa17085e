//! Analysis prompt construction.
//!
//! The providers all receive the same structured prompt: exam header,
//! per-answer detail, and a fixed instruction block requesting the four
//! literal sections the parser looks for.

use serde::{Deserialize, Serialize};

use scriptmark_core::model::{Question, Submission};

/// Per-answer detail included in the analysis prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerContext {
    pub question: String,
    pub expected_answer: String,
    pub student_answer: String,
    pub marks_obtained: f64,
    pub marks_allocated: f64,
    pub feedback: String,
}

/// Everything the analysis prompt needs from a graded submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionContext {
    pub exam_title: String,
    pub total_marks: f64,
    pub obtained_marks: f64,
    pub percentage: f64,
    pub answers: Vec<AnswerContext>,
}

impl SubmissionContext {
    /// Build the context from a graded submission and its questions.
    ///
    /// Answers whose question record is missing are skipped with a
    /// warning: analysis runs after grading and must not fail it.
    pub fn from_submission(submission: &Submission, questions: &[Question]) -> Self {
        let mut answers = Vec::with_capacity(submission.answers.len());
        for answer in &submission.answers {
            let Some(question) = questions.iter().find(|q| q.id == answer.question_id) else {
                tracing::warn!(
                    question = %answer.question_id,
                    "skipping answer with missing question in analysis context"
                );
                continue;
            };
            answers.push(AnswerContext {
                question: question.text.clone(),
                expected_answer: question.expected_answer.clone(),
                student_answer: answer.answer_text.clone(),
                marks_obtained: answer.marks_obtained,
                marks_allocated: answer.marks_allocated,
                feedback: answer.feedback.clone(),
            });
        }

        Self {
            exam_title: submission.exam_title.clone(),
            total_marks: submission.total_marks,
            obtained_marks: submission.obtained_marks,
            percentage: submission.percentage,
            answers,
        }
    }
}

/// Render the full analysis prompt for a graded submission.
pub fn build_prompt(context: &SubmissionContext) -> String {
    let mut prompt = format!(
        "You are an educational assessment expert. Analyze this student's exam performance \
         and provide constructive feedback.\n\n\
         Exam: {}\n\
         Score: {}/{} ({}%)\n\n\
         Detailed Answers:\n",
        context.exam_title, context.obtained_marks, context.total_marks, context.percentage
    );

    for (idx, answer) in context.answers.iter().enumerate() {
        prompt.push_str(&format!(
            "\nQuestion {}: {}\n\
             Expected Answer: {}\n\
             Student's Answer: {}\n\
             Score: {}/{}\n\
             Initial Feedback: {}\n",
            idx + 1,
            answer.question,
            answer.expected_answer,
            answer.student_answer,
            answer.marks_obtained,
            answer.marks_allocated,
            answer.feedback
        ));
    }

    prompt.push_str(
        "\nPlease provide:\n\
         1. SUMMARY: A brief overall assessment (2-3 sentences)\n\
         2. STRENGTHS: What the student did well (3-4 points)\n\
         3. AREAS FOR IMPROVEMENT: What needs work (3-4 points)\n\
         4. SUGGESTIONS: Specific actionable recommendations (3-4 points)\n\n\
         Keep the feedback encouraging, constructive, and specific. Focus on learning \
         outcomes. Respond in plain text, not Markdown.\n",
    );

    prompt
}
