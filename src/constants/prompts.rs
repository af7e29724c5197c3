// Prompt templates. Placeholders in `{braces}` are filled with `str::replace`
// by the quiz generation service.

pub const TITLE_SYSTEM_PROMPT: &str =
    "You are an educational assistant. You always answer with a single valid JSON object and never use markdown.";

pub const TITLE_USER_PROMPT: &str = "You write titles and descriptions for study material.

Based on the text below, write:
1. A concise, informative title (at most 100 characters)
2. A clear description of what will be studied (at most 300 characters)

## STUDY MATERIAL
\"{content}\"

## OUTPUT
Return ONLY a JSON object of the form:
{\"title\": \"...\", \"description\": \"...\"}";

pub const QUIZ_SYSTEM_PROMPT: &str = "You are an expert teacher who writes high-quality multiple-choice quizzes. You always answer with a single valid JSON object and never use markdown.";

pub const QUIZ_RULES: &str = "## RULES
1. Write EXACTLY 7 questions
2. Every question has EXACTLY 4 options
3. EXACTLY 1 option per question is correct
4. Wrong options are plausible but clearly distinct from the correct one
5. Every question carries a short explanation (1-2 sentences) of why the correct option is correct
6. Use clear, direct language and avoid trick questions

## OUTPUT
Return ONLY a JSON object matching this JSON schema:
{schema}";

pub const FRESH_QUIZ_PROMPT: &str = "## CONTEXT
Title: {title}
Description: {description}
Full content: {content}

## TASK
Write a quiz about this content. Questions must cover different aspects of the content and vary in difficulty (easy, medium, hard).

{rules}";

pub const REINFORCEMENT_QUIZ_PROMPT: &str = "## CONTEXT
Content title: {title}
Original content: {content}

The learner has already answered these questions:
{prior_questions}

## TASK
Write a NEW follow-up quiz on the same content.
1. Do NOT repeat or closely paraphrase any question listed above
2. Do NOT reuse concepts that are very close to the ones already asked
3. Explore new aspects and new angles of the same content
4. Make the quiz somewhat harder than the previous ones

{rules}";

pub const PROGRESSION_QUIZ_PROMPT: &str = "## CONTEXT
Content title: {title}
Original content: {content}

In their most recent attempt the learner got these questions wrong. Treat each one as a sub-topic that needs work:
{wrong_answers}

## TASK
Write a NEW quiz that drills into the sub-topics behind the statements and explanations above.
1. Target the specific gaps these mistakes reveal, not a general review
2. Do NOT repeat the original statements or their options verbatim
3. Vary the angle and the level of detail so the learner can progress on each sub-topic

{rules}";

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a patient, didactic teacher who writes personalised review notes to help learners improve.";

pub const SUMMARY_USER_PROMPT: &str = "## CONTEXT
The learner just finished a quiz about: \"{title}\"
They got {wrong_count} of {total} questions wrong.

## MISTAKES
{mistakes}

## TASK
Write a review (at most 500 words) that:
1. Names the concepts the learner should revisit
2. Explains clearly where each mistake went wrong
3. Gives practical tips to remember or understand those concepts
4. Suggests how to do better on the next quiz

Use an encouraging tone. Write plain prose in paragraphs, with no markdown, no headings and no greeting.";

pub const CONGRATULATIONS_MESSAGE: &str = "Congratulations! You answered every question correctly. Keep it up and keep deepening your study of this topic.";
