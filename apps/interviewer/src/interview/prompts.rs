// Interview LLM prompt templates.
// All prompts for the interview module are defined here.

pub const QUESTION_SYSTEM: &str = "You are an expert technical and HR interviewer.";

pub const QUESTION_PROMPT_TEMPLATE: &str = r#"You are conducting a {interview_type} interview.

Job Description:
{jd_text}

Candidate's Resume:
{resume_text}
{history}
This is question {question_num} out of {total_questions} questions total.

Generate ONE relevant {interview_type} interview question that:
- Is appropriate for question number {question_num} (start easier, get progressively harder)
- Relates to the job requirements
- Builds upon previous answers if any
- Is specific and clear
- Focuses on {focus}

{plain_text_only}"#;

pub const EVALUATION_SYSTEM: &str = "You are an expert interview evaluator.";

pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"Evaluate this {interview_type} interview answer.

Job Requirements:
{jd_text}

Question: {question}
Answer: {answer}

Provide:
1. A score from 0-10 (0=poor, 10=excellent)
2. Brief constructive feedback (2-3 sentences)

Consider:
- Relevance to the question
- Depth of knowledge
- Communication clarity
- Alignment with job requirements

Return ONLY valid JSON in this exact format:
{"score": 8, "feedback": "Your feedback here"}"#;
