//! Grading entry points.
//!
//! [`grade_submission`] is the whole pipeline: read both PDFs, split them into
//! answers, and grade each (student, model) pair by position. The other entry
//! points expose pieces of it for callers that already hold bytes or text.
//!
//! A request either produces a complete [`GradingReport`] or fails with a
//! single [`GradeError`]. There is no partial grading.

use crate::config::GradingConfig;
use crate::error::GradeError;
use crate::output::{DocumentRole, DocumentText, GradingReport, GradingStats, ScoreResult};
use crate::pipeline::feedback::generate_feedback;
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::keywords::derive_keywords;
use crate::pipeline::llm::{self, TextGenerator};
use crate::pipeline::ocr::{TesseractExtractor, TextExtractor};
use crate::pipeline::render::{PageRenderer, PdfiumRenderer};
use crate::pipeline::score::score_answer;
use crate::pipeline::segment::segment_answers;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Grade a student's answer sheet against the model-answer key.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `student_pdf` — the student's handwritten submission
/// * `model_pdf` — the model-answer key
/// * `config` — grading configuration; `config.max_marks` is the mark
///   available per question
///
/// # Errors
/// Every failure is fatal to the request:
/// - invalid `max_marks` ⇒ [`GradeError::Validation`]
/// - unreadable or non-PDF input ⇒ [`GradeError::Render`]
/// - OCR engine failure ⇒ [`GradeError::Ocr`]
/// - different answer counts ⇒ [`GradeError::AnswerCountMismatch`]
/// - text generation failure ⇒ [`GradeError::KeywordExtraction`] or
///   [`GradeError::Feedback`]
pub async fn grade_submission(
    student_pdf: impl AsRef<Path>,
    model_pdf: impl AsRef<Path>,
    config: &GradingConfig,
) -> Result<GradingReport, GradeError> {
    config.validate()?;
    let student = resolve_path(DocumentRole::Student, student_pdf.as_ref())?;
    let model = resolve_path(DocumentRole::ModelAnswer, model_pdf.as_ref())?;
    grade_resolved(&student, &model, config).await
}

/// Synchronous wrapper around [`grade_submission`].
///
/// Creates a temporary tokio runtime internally.
pub fn grade_submission_sync(
    student_pdf: impl AsRef<Path>,
    model_pdf: impl AsRef<Path>,
    config: &GradingConfig,
) -> Result<GradingReport, GradeError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| GradeError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(grade_submission(student_pdf, model_pdf, config))
}

/// Grade two uploaded PDFs held in memory.
///
/// Both buffers must be non-empty. Each is written into its own temporary
/// directory, which is removed when this function returns.
pub async fn grade_submission_bytes(
    student: &[u8],
    model: &[u8],
    config: &GradingConfig,
) -> Result<GradingReport, GradeError> {
    if student.is_empty() || model.is_empty() {
        return Err(GradeError::Validation("Please upload both files.".into()));
    }
    config.validate()?;

    let student = input::materialise_upload(student, "student.pdf").await?;
    let model = input::materialise_upload(model, "model_answer.pdf").await?;
    for (role, resolved) in [
        (DocumentRole::Student, &student),
        (DocumentRole::ModelAnswer, &model),
    ] {
        input::resolve_local(resolved.path())
            .map_err(|source| log_error(GradeError::Render { document: role, source }))?;
    }

    grade_resolved(&student, &model, config).await
}

/// Render and read a single document.
///
/// Needs no text generator, so it works without any AI credentials.
pub async fn extract_document(
    role: DocumentRole,
    pdf: impl AsRef<Path>,
    config: &GradingConfig,
) -> Result<DocumentText, GradeError> {
    let resolved = resolve_path(role, pdf.as_ref())?;
    let renderer = resolve_renderer(config);
    let extractor = resolve_extractor(config);
    read_document(role, resolved.path(), renderer.as_ref(), extractor.as_ref(), config).await
}

/// Segment and grade two transcripts that have already been extracted.
///
/// Page counts in the returned stats are zero.
pub async fn grade_texts(
    student_text: &str,
    model_text: &str,
    config: &GradingConfig,
) -> Result<GradingReport, GradeError> {
    let total_start = Instant::now();
    config.validate()?;
    let generator = resolve_generator(config)?;

    let (results, total_score) =
        grade_transcripts(student_text, model_text, generator.as_ref(), config).await?;

    let elapsed = total_start.elapsed().as_millis() as u64;
    Ok(GradingReport {
        stats: GradingStats {
            questions: results.len(),
            grading_duration_ms: elapsed,
            total_duration_ms: elapsed,
            ..Default::default()
        },
        results,
        total_score,
        max_marks: config.max_marks,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn grade_resolved(
    student: &ResolvedInput,
    model: &ResolvedInput,
    config: &GradingConfig,
) -> Result<GradingReport, GradeError> {
    let total_start = Instant::now();
    info!(
        "Grading {} against {}",
        student.path().display(),
        model.path().display()
    );

    // ── Step 1: Resolve components ───────────────────────────────────────
    let generator = resolve_generator(config)?;
    let renderer = resolve_renderer(config);
    let extractor = resolve_extractor(config);

    // ── Step 2: Render + OCR both documents ──────────────────────────────
    let extract_start = Instant::now();
    let (student_doc, model_doc) = tokio::try_join!(
        read_document(
            DocumentRole::Student,
            student.path(),
            renderer.as_ref(),
            extractor.as_ref(),
            config,
        ),
        read_document(
            DocumentRole::ModelAnswer,
            model.path(),
            renderer.as_ref(),
            extractor.as_ref(),
            config,
        ),
    )?;
    let extraction_duration_ms = extract_start.elapsed().as_millis() as u64;
    debug!("Student text: {}", student_doc.text);
    debug!("Model answer text: {}", model_doc.text);

    // ── Step 3: Segment + grade ──────────────────────────────────────────
    let grading_start = Instant::now();
    let (results, total_score) =
        grade_transcripts(&student_doc.text, &model_doc.text, generator.as_ref(), config).await?;
    let grading_duration_ms = grading_start.elapsed().as_millis() as u64;

    let stats = GradingStats {
        student_pages: student_doc.page_count,
        model_pages: model_doc.page_count,
        questions: results.len(),
        extraction_duration_ms,
        grading_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Grading complete: {} questions, total {}, {}ms",
        stats.questions, total_score, stats.total_duration_ms
    );

    Ok(GradingReport {
        results,
        total_score,
        max_marks: config.max_marks,
        stats,
    })
}

/// Render every page of one document and OCR them, joining page texts with a
/// single space in page order.
async fn read_document(
    role: DocumentRole,
    pdf_path: &Path,
    renderer: &dyn PageRenderer,
    extractor: &dyn TextExtractor,
    config: &GradingConfig,
) -> Result<DocumentText, GradeError> {
    let pages = renderer
        .render(pdf_path)
        .await
        .map_err(|source| log_error(GradeError::Render { document: role, source }))?;
    info!("Rendered {} pages of the {} document", pages.len(), role);

    let texts: Vec<String> = stream::iter(pages.iter().enumerate().map(|(idx, image)| async move {
        let text = extractor.extract(image).await.map_err(|source| {
            log_error(GradeError::Ocr {
                document: role,
                page: idx + 1,
                source,
            })
        })?;
        debug!("{} page {}: {} chars", role, idx + 1, text.len());
        Ok::<_, GradeError>(text)
    }))
    .buffered(config.concurrency)
    .try_collect()
    .await?;

    let text = texts.join(" ");
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_extracted(role, pages.len(), text.chars().count());
    }

    Ok(DocumentText {
        role,
        page_count: pages.len(),
        text,
    })
}

/// Segment both transcripts and grade each positional pair.
///
/// Returns the per-question results in order and the sum of their integer
/// scores.
async fn grade_transcripts(
    student_text: &str,
    model_text: &str,
    generator: &dyn TextGenerator,
    config: &GradingConfig,
) -> Result<(Vec<ScoreResult>, u32), GradeError> {
    let student_answers = segment_answers(student_text);
    let model_answers = segment_answers(model_text);
    info!(
        "Found {} student answers and {} model answers",
        student_answers.len(),
        model_answers.len()
    );

    if student_answers.len() != model_answers.len() {
        return Err(log_error(GradeError::AnswerCountMismatch {
            student: student_answers.len(),
            model: model_answers.len(),
        }));
    }

    let total = student_answers.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_grading_start(total);
    }

    let results: Vec<ScoreResult> = stream::iter(
        student_answers
            .iter()
            .zip(&model_answers)
            .enumerate()
            .map(|(idx, (student, model))| {
                grade_question(generator, idx + 1, total, student, model, config)
            }),
    )
    .buffered(config.concurrency)
    .try_collect()
    .await?;

    let total_score: u32 = results.iter().map(|r| r.score).sum();
    if let Some(ref cb) = config.progress_callback {
        cb.on_grading_complete(total_score, config.max_marks * total as f64);
    }
    Ok((results, total_score))
}

async fn grade_question(
    generator: &dyn TextGenerator,
    question: usize,
    total: usize,
    student_answer: &str,
    model_answer: &str,
    config: &GradingConfig,
) -> Result<ScoreResult, GradeError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_question_start(question, total);
    }

    let keywords = derive_keywords(generator, model_answer, config.keyword_prompt.as_deref())
        .await
        .map_err(|source| log_error(GradeError::KeywordExtraction { question, source }))?;

    let raw_score = score_answer(student_answer, model_answer, config.max_marks, &keywords);
    // Truncation toward zero; raw_score is never negative.
    let score = raw_score.trunc() as u32;

    let feedback = generate_feedback(
        generator,
        student_answer,
        model_answer,
        score,
        config.max_marks,
        config.feedback_prompt.as_deref(),
    )
    .await
    .map_err(|source| log_error(GradeError::Feedback { question, source }))?;

    info!(
        "Question {}: {} / {} (raw {:.2}, {} keywords)",
        question,
        score,
        config.max_marks,
        raw_score,
        keywords.len()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_question_graded(question, total, score, config.max_marks);
    }

    Ok(ScoreResult {
        question,
        student_answer: student_answer.to_string(),
        model_answer: model_answer.to_string(),
        keywords: keywords.into_vec(),
        raw_score,
        score,
        feedback,
    })
}

fn resolve_path(role: DocumentRole, path: &Path) -> Result<ResolvedInput, GradeError> {
    input::resolve_local(path)
        .map_err(|source| log_error(GradeError::Render { document: role, source }))
}

fn resolve_generator(config: &GradingConfig) -> Result<Arc<dyn TextGenerator>, GradeError> {
    llm::resolve_generator(config)
        .map_err(|e| log_error(GradeError::GeneratorUnavailable(e)))
}

fn resolve_renderer(config: &GradingConfig) -> Arc<dyn PageRenderer> {
    match config.renderer {
        Some(ref renderer) => Arc::clone(renderer),
        None => Arc::new(PdfiumRenderer::new(
            config.pdf_renderer_path.clone(),
            config.max_rendered_pixels,
            config.password.clone(),
        )),
    }
}

fn resolve_extractor(config: &GradingConfig) -> Arc<dyn TextExtractor> {
    match config.extractor {
        Some(ref extractor) => Arc::clone(extractor),
        None => Arc::new(TesseractExtractor::new(config.ocr_engine_path.clone())),
    }
}

fn log_error(err: GradeError) -> GradeError {
    error!("{}", err);
    err
}
