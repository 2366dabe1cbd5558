//! Blog series workflow: plan a roadmap, then write each post.
//!
//! Two pipelines run back to back. The planning pipeline's terminal task
//! returns a JSON roadmap which is rendered to `Blog_Series_Roadmap.md`;
//! the writing pipeline then runs once per planned post and each terminal
//! output becomes `Blog_Post_<n>_<title>.md`. A previously written roadmap
//! can be reused with `--skip-planning --roadmap-file`, parsed back from its
//! Markdown form.

use std::path::Path;

use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use super::WorkflowError;
use crate::cli::BlogArgs;
use crate::credentials::DEFAULT_MODEL;
use crate::input::InputError;
use crate::output::OutputWriter;
use crate::pipeline::{run_plan, ExecutionPlan, PipelineConfig, RunContext, TaskResult};
use crate::runner::TaskRunner;
use crate::util::wrap_for_console;

const DEFAULT_TOPIC: &str = "Python Design Patterns for Machine Learning";
const DEFAULT_GOAL: &str = "Create a comprehensive series of technical blog posts covering the \
most common design patterns used in machine learning. Each post should explain a specific \
pattern with real-world examples, code snippets, and diagrams, suitable for intermediate ML \
engineers looking to improve their skills.";

/// One planned post in the series roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPostOutline {
    pub title: String,
    pub description: String,
}

/// Structured output of the planning pipeline's terminal task.
#[derive(Debug, Clone, Deserialize)]
pub struct BlogRoadmap {
    pub posts: Vec<BlogPostOutline>,
}

/// Structured output of the writing pipeline's terminal task.
#[derive(Debug, Clone, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub content: String,
}

/// A roadmap together with the topic and goal it was planned for.
#[derive(Debug, Clone)]
pub struct SeriesPlan {
    pub topic: String,
    pub goal: String,
    pub posts: Vec<BlogPostOutline>,
}

/// Run the blog workflow end to end.
pub async fn run(args: &BlogArgs, runner: &dyn TaskRunner) -> Result<(), WorkflowError> {
    let topic = args
        .topic
        .clone()
        .unwrap_or_else(|| DEFAULT_TOPIC.to_string());
    let goal = args.goal.clone().unwrap_or_else(|| DEFAULT_GOAL.to_string());
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let (series, freshly_planned) = if args.skip_planning {
        let path = args
            .roadmap_file
            .as_deref()
            .ok_or_else(|| InputError::MissingArgument("--roadmap-file".to_string()))?;
        let series = parse_roadmap_file(path)?;
        info!(posts = series.posts.len(), roadmap = %path.display(), "reusing existing roadmap");
        (series, false)
    } else {
        let config = PipelineConfig::load(&args.config_dir.join("blog_planning"))?;
        let plan = ExecutionPlan::build(&config)?;
        let ctx = RunContext::new(&args.output_dir, &model)
            .with_var("topic", &topic)
            .with_var("goal", &goal);

        info!(run = %ctx.id, tasks = plan.len(), "starting blog planning pipeline");
        let results = run_plan(&plan, &ctx, runner).await?;
        let roadmap: BlogRoadmap = parse_terminal_output(&results)?;
        info!(posts = roadmap.posts.len(), "roadmap planned");
        println!("{}", wrap_for_console(&overview(&roadmap.posts), 80));
        (
            SeriesPlan {
                topic: topic.clone(),
                goal: goal.clone(),
                posts: roadmap.posts,
            },
            true,
        )
    };

    let writer = OutputWriter::create(&args.output_dir)?;
    if freshly_planned {
        let rendered = render_roadmap(&series);
        let path = writer.write("Blog_Series_Roadmap.md", &rendered)?;
        info!(path = %path.display(), "roadmap saved");
    }

    let writing_config = PipelineConfig::load(&args.config_dir.join("blog_writing"))?;
    let writing_plan = ExecutionPlan::build(&writing_config)?;
    let roadmap_overview = overview(&series.posts);
    let total = series.posts.len();

    for (index, outline) in series.posts.iter().enumerate() {
        info!(
            post = index + 1,
            of = total,
            title = %outline.title,
            "writing blog post"
        );

        let ctx = RunContext::new(&args.output_dir, &model)
            .with_var("topic", &series.topic)
            .with_var("goal", &series.goal)
            .with_var("post_title", &outline.title)
            .with_var("post_description", &outline.description)
            .with_var("post_index", index.to_string())
            .with_var("post_index_plus_one", (index + 1).to_string())
            .with_var("total_posts", total.to_string())
            .with_var("blog_roadmap", &roadmap_overview);

        let results = run_plan(&writing_plan, &ctx, runner).await?;
        let post: BlogPost = parse_terminal_output(&results)?;
        let path = writer.write(&post_filename(index + 1, &post.title), &post.content)?;
        info!(path = %path.display(), "blog post saved");
    }

    info!(posts = total, dir = %writer.dir().display(), "blog workflow completed");
    Ok(())
}

/// Numbered one-line-per-post summary injected into writing prompts.
fn overview(posts: &[BlogPostOutline]) -> String {
    posts
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {} - {}", i + 1, p.title, p.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse the terminal task's output as JSON, tolerating code fences.
fn parse_terminal_output<T: DeserializeOwned>(results: &[TaskResult]) -> Result<T, WorkflowError> {
    let last = results.last().ok_or_else(|| WorkflowError::MalformedOutput {
        task: "(none)".to_string(),
        reason: "pipeline produced no results".to_string(),
    })?;

    let body = extract_json(&last.output).ok_or_else(|| WorkflowError::MalformedOutput {
        task: last.task.clone(),
        reason: "no JSON object found in output".to_string(),
    })?;

    serde_json::from_str(body).map_err(|e| WorkflowError::MalformedOutput {
        task: last.task.clone(),
        reason: e.to_string(),
    })
}

/// Slice the first top-level JSON object out of a model response.
fn extract_json(output: &str) -> Option<&str> {
    let start = output.find('{')?;
    let end = output.rfind('}')?;
    (end > start).then(|| &output[start..=end])
}

/// Render the series plan in the documented roadmap Markdown shape.
pub fn render_roadmap(series: &SeriesPlan) -> String {
    let mut out = String::from("# Blog Series Roadmap\n\n");
    out.push_str(&format!("## Topic: {}\n\n", series.topic));
    out.push_str(&format!("## Goal\n{}\n\n", series.goal));
    out.push_str("## Planned Posts\n\n");
    for (i, post) in series.posts.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, post.title));
        out.push_str(&format!("{}\n\n", post.description));
    }
    out
}

/// Parse a roadmap Markdown file written by [`render_roadmap`].
pub fn parse_roadmap_file(path: &Path) -> Result<SeriesPlan, WorkflowError> {
    if !path.exists() {
        return Err(InputError::InvalidInputFile {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string(),
        }
        .into());
    }
    let content = std::fs::read_to_string(path).map_err(|e| InputError::InvalidInputFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let series = parse_roadmap(&content).ok_or_else(|| InputError::InvalidInputFile {
        path: path.to_path_buf(),
        reason: "not a recognizable roadmap file".to_string(),
    })?;
    Ok(series)
}

/// Parse roadmap Markdown: topic, goal, and the numbered post outlines.
fn parse_roadmap(content: &str) -> Option<SeriesPlan> {
    let topic_re = Regex::new(r"(?m)^## Topic: (.+)$").ok()?;
    let goal_re = Regex::new(r"(?s)## Goal\n(.*?)\n\n## Planned Posts").ok()?;
    let header_re = Regex::new(r"(?m)^### \d+\. (.+)$").ok()?;

    let topic = topic_re.captures(content)?[1].trim().to_string();
    let goal = goal_re.captures(content)?[1].trim().to_string();

    // Each post's description is the text between its header and the next.
    let headers: Vec<_> = header_re.captures_iter(content).collect();
    let mut posts = Vec::with_capacity(headers.len());
    for (i, caps) in headers.iter().enumerate() {
        let title = caps[1].trim().to_string();
        let body_start = caps.get(0)?.end();
        let body_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(content.len());
        let description = content[body_start..body_end].trim().to_string();
        posts.push(BlogPostOutline { title, description });
    }

    if posts.is_empty() {
        return None;
    }
    Some(SeriesPlan { topic, goal, posts })
}

/// File name for post `number` (1-based), with a path-safe title.
pub fn post_filename(number: usize, title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
        .collect();
    format!("Blog_Post_{number}_{safe}.md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AgentSpec;
    use crate::runner::{RunnerError, TaskRunner};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_series() -> SeriesPlan {
        SeriesPlan {
            topic: "Rust CLIs".to_string(),
            goal: "Teach practical CLI design.\nWith examples.".to_string(),
            posts: vec![
                BlogPostOutline {
                    title: "Parsing Arguments".to_string(),
                    description: "Derive-based parsers.\n\nAnd validation.".to_string(),
                },
                BlogPostOutline {
                    title: "Shipping Binaries".to_string(),
                    description: "Cross compilation notes.".to_string(),
                },
            ],
        }
    }

    #[test]
    fn roadmap_round_trips_through_markdown() {
        let series = sample_series();
        let rendered = render_roadmap(&series);
        let parsed = parse_roadmap(&rendered).unwrap();

        assert_eq!(parsed.topic, series.topic);
        assert_eq!(parsed.goal, series.goal);
        assert_eq!(parsed.posts, series.posts);
    }

    #[test]
    fn unrecognizable_roadmap_is_rejected() {
        assert!(parse_roadmap("# Some other document\n\nhello").is_none());
        assert!(parse_roadmap("## Topic: x\n\n## Goal\ny\n\n## Planned Posts\n\n").is_none());
    }

    #[test]
    fn terminal_json_parses_through_code_fences() {
        let results = vec![TaskResult::new(
            "review_roadmap",
            "Here is the roadmap:\n```json\n{\"posts\": [{\"title\": \"A\", \"description\": \"B\"}]}\n```",
        )];
        let roadmap: BlogRoadmap = parse_terminal_output(&results).unwrap();
        assert_eq!(roadmap.posts.len(), 1);
        assert_eq!(roadmap.posts[0].title, "A");
    }

    #[test]
    fn malformed_terminal_json_names_the_task() {
        let results = vec![TaskResult::new("review_roadmap", "no json here")];
        match parse_terminal_output::<BlogRoadmap>(&results).unwrap_err() {
            WorkflowError::MalformedOutput { task, .. } => assert_eq!(task, "review_roadmap"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn post_filenames_are_path_safe() {
        assert_eq!(
            post_filename(1, "Parsing Arguments"),
            "Blog_Post_1_Parsing_Arguments.md"
        );
        assert_eq!(
            post_filename(3, "I/O: Pitfalls & Fixes"),
            "Blog_Post_3_IO_Pitfalls__Fixes.md"
        );
    }

    /// Runner whose answers depend on the agent, good enough for both
    /// pipelines: planners return a roadmap, writers return a post.
    struct BlogStubRunner;

    #[async_trait]
    impl TaskRunner for BlogStubRunner {
        async fn execute(&self, agent: &AgentSpec, prompt: &str) -> Result<String, RunnerError> {
            Ok(match agent.name.as_str() {
                "reviewer" if prompt.contains("roadmap") => {
                    r#"{"posts": [{"title": "First Post", "description": "Intro."},
                                  {"title": "Second Post", "description": "Depth."}]}"#
                        .to_string()
                }
                "reviewer" => {
                    r#"{"title": "First Post", "content": "Body of the post."}"#.to_string()
                }
                other => format!("notes from {other}"),
            })
        }
    }

    const PLANNING_AGENTS: &str = r#"
strategist:
  role: Strategist
  goal: Shape the series.
  backstory: Planner.
  tools: [search]

reviewer:
  role: Reviewer
  goal: Approve the roadmap.
  backstory: Editor.
"#;

    const PLANNING_TASKS: &str = r#"
develop_strategy:
  description: "Outline a series on {topic} aiming to {goal}."
  expected_output: Strategy notes.
  agent: strategist

review_roadmap:
  description: "Turn the strategy into the final roadmap JSON."
  expected_output: "A JSON object with a posts array."
  agent: reviewer
  depends_on: [develop_strategy]
"#;

    const WRITING_AGENTS: &str = r#"
content_writer:
  role: Writer
  goal: Draft the post.
  backstory: Writer.
  tools: [search, scrape]

reviewer:
  role: Reviewer
  goal: Finalize the post.
  backstory: Editor.
"#;

    const WRITING_TASKS: &str = r#"
write_content:
  description: "Write post {post_index_plus_one} of {total_posts}: {post_title}."
  expected_output: Draft.
  agent: content_writer

review_blog_post:
  description: "Finalize the draft as JSON with title and content."
  expected_output: "A JSON object with title and content."
  agent: reviewer
  depends_on: [write_content]
"#;

    fn write_blog_configs(root: &Path) -> PathBuf {
        let config_dir = root.join("config");
        let planning = config_dir.join("blog_planning");
        let writing = config_dir.join("blog_writing");
        std::fs::create_dir_all(&planning).unwrap();
        std::fs::create_dir_all(&writing).unwrap();
        std::fs::write(planning.join("agents.yaml"), PLANNING_AGENTS).unwrap();
        std::fs::write(planning.join("tasks.yaml"), PLANNING_TASKS).unwrap();
        std::fs::write(writing.join("agents.yaml"), WRITING_AGENTS).unwrap();
        std::fs::write(writing.join("tasks.yaml"), WRITING_TASKS).unwrap();
        config_dir
    }

    fn blog_args(root: &Path, config_dir: PathBuf) -> BlogArgs {
        BlogArgs {
            topic: Some("Rust CLIs".to_string()),
            goal: Some("Teach CLI design.".to_string()),
            skip_planning: false,
            roadmap_file: None,
            output_dir: root.join("output"),
            config_dir,
            model: None,
        }
    }

    #[tokio::test]
    async fn full_flow_writes_roadmap_and_posts() {
        let root = TempDir::new().unwrap();
        let config_dir = write_blog_configs(root.path());

        run(&blog_args(root.path(), config_dir), &BlogStubRunner)
            .await
            .unwrap();

        let output = root.path().join("output");
        let roadmap = std::fs::read_to_string(output.join("Blog_Series_Roadmap.md")).unwrap();
        assert!(roadmap.contains("## Topic: Rust CLIs"));
        assert!(roadmap.contains("### 1. First Post"));
        assert!(roadmap.contains("### 2. Second Post"));

        // The stub returns the same post JSON for every outline; both files
        // are named after the returned title.
        assert!(output.join("Blog_Post_1_First_Post.md").exists());
        assert!(output.join("Blog_Post_2_First_Post.md").exists());
    }

    #[tokio::test]
    async fn skip_planning_requires_a_roadmap_file() {
        let root = TempDir::new().unwrap();
        let config_dir = write_blog_configs(root.path());
        let mut args = blog_args(root.path(), config_dir);
        args.skip_planning = true;

        let err = run(&args, &BlogStubRunner).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Input(InputError::MissingArgument(ref f)) if f == "--roadmap-file"
        ));
    }

    #[tokio::test]
    async fn skip_planning_reuses_the_parsed_roadmap() {
        let root = TempDir::new().unwrap();
        let config_dir = write_blog_configs(root.path());

        let roadmap_path = root.path().join("roadmap.md");
        std::fs::write(&roadmap_path, render_roadmap(&sample_series())).unwrap();

        let mut args = blog_args(root.path(), config_dir);
        args.skip_planning = true;
        args.roadmap_file = Some(roadmap_path);

        run(&args, &BlogStubRunner).await.unwrap();

        let output = root.path().join("output");
        // No fresh roadmap is written when reusing one.
        assert!(!output.join("Blog_Series_Roadmap.md").exists());
        assert!(output.join("Blog_Post_1_First_Post.md").exists());
        assert!(output.join("Blog_Post_2_First_Post.md").exists());
    }
}
