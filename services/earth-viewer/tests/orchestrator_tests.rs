//! End-to-end orchestration: layers, views, fields, animation and status.

use earth_common::{EarthError, GridRecord, Product};
use earth_viewer::{
    AgentEvent, LayerRequest, Orchestrator, PngFrameSink, StatusLevel, ViewerConfig,
};
use field::Sample;
use projection::{Orientation, ProjectionKind};
use std::path::PathBuf;
use tempfile::TempDir;
use test_utils::{
    global_10deg, temperature_record, uniform_wind_records, views, write_records_file,
};

// ============================================================================
// Helpers
// ============================================================================

fn config(output: &TempDir) -> ViewerConfig {
    let mut config = ViewerConfig {
        width: views::SMALL.0,
        height: views::SMALL.1,
        frames: 6,
        frame_every: 2,
        output_dir: output.path().to_path_buf(),
        ..Default::default()
    };
    config.animation.frame_interval_ms = 1;
    config.animation.seed = Some(17);
    config.field.yield_delay_ms = 1;
    config
}

struct Fixture {
    orchestrator: Orchestrator,
    output: TempDir,
    _files: Vec<TempDir>,
}

impl Fixture {
    fn new(kind: ProjectionKind) -> Self {
        let output = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(config(&output)).unwrap();
        orchestrator.set_view(kind, Orientation::default()).unwrap();
        Self {
            orchestrator,
            output,
            _files: Vec::new(),
        }
    }

    fn file(&mut self, records: &[GridRecord]) -> PathBuf {
        let (dir, path) = write_records_file(records);
        self._files.push(dir);
        path
    }

    fn wind_file(&mut self) -> PathBuf {
        self.file(&uniform_wind_records(&global_10deg(), 10.0, 0.0))
    }
}

// ============================================================================
// Pipeline
// ============================================================================

#[tokio::test]
async fn test_full_pipeline_writes_frames() {
    let mut fx = Fixture::new(ProjectionKind::Orthographic);
    let wind = fx.wind_file();
    let o = &fx.orchestrator;

    o.load_layers(LayerRequest::new(wind, Product::Wind), None);
    o.settle().await;
    assert!(o.primary().value().is_some());

    o.rebuild_field().unwrap();
    o.settle().await;
    let field = o.field().value().expect("field published");
    assert!(field.defined_count() > 0);

    let sink = PngFrameSink::new(
        fx.output.path(),
        field.overlay().rgba().to_vec(),
        o.config().frame_every,
        o.config().frames,
    );
    o.start_animation(sink).unwrap();
    o.settle().await;

    assert_eq!(o.animation().value().map(|r| r.frames), Some(6));
    assert_eq!(o.status().snapshot().level, StatusLevel::Idle);

    let mut written: Vec<String> = std::fs::read_dir(fx.output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(
        written,
        vec!["frame-0000.png", "frame-0002.png", "frame-0004.png"]
    );
}

#[tokio::test]
async fn test_overlay_layer_colors_field() {
    let mut fx = Fixture::new(ProjectionKind::Equirectangular);
    let wind = fx.wind_file();
    let temp = fx.file(&[temperature_record(&global_10deg())]);
    let o = &fx.orchestrator;

    o.load_layers(
        LayerRequest::new(wind, Product::Wind),
        Some(LayerRequest::new(temp, Product::Temperature)),
    );
    o.settle().await;
    o.rebuild_field().unwrap();
    o.settle().await;

    let field = o.field().value().unwrap();
    let (cx, cy) = o.view_state().unwrap().projection.project(0.0, 0.0).unwrap();
    let pixel = field.overlay().get(cx.round() as usize, cy.round() as usize);
    let wind_color = Product::Wind.scale().gradient(10.0, o.config().field.overlay_alpha);
    assert_ne!(pixel, wind_color);
    assert_eq!(pixel[3], o.config().field.overlay_alpha);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_rebuild_twice_completes_once() {
    let mut fx = Fixture::new(ProjectionKind::Orthographic);
    let wind = fx.wind_file();
    let o = &fx.orchestrator;
    o.load_layers(LayerRequest::new(wind, Product::Wind), None);
    o.settle().await;

    let mut rx = o.field().subscribe();
    let first = o.rebuild_field().unwrap();
    let second = o.rebuild_field().unwrap();
    o.settle().await;

    let mut completions = Vec::new();
    let mut cancellations = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            AgentEvent::Completed { epoch, .. } => completions.push(epoch),
            AgentEvent::Cancelled { epoch } => cancellations.push(epoch),
            _ => {}
        }
    }
    assert_eq!(completions, vec![second]);
    assert_eq!(cancellations, vec![first]);
}

#[tokio::test]
async fn test_new_view_cancels_interpolation() {
    let mut fx = Fixture::new(ProjectionKind::Orthographic);
    let wind = fx.wind_file();
    let o = &fx.orchestrator;
    o.load_layers(LayerRequest::new(wind, Product::Wind), None);
    o.settle().await;

    o.rebuild_field().unwrap();
    o.set_view(
        ProjectionKind::Orthographic,
        Orientation {
            lon: 90.0,
            lat: 30.0,
            scale: None,
        },
    )
    .unwrap();
    o.settle().await;

    assert!(o.field().value().is_none());
    assert!(!o.field().is_running());
}

#[tokio::test]
async fn test_new_field_cancels_animation() {
    let mut fx = Fixture::new(ProjectionKind::Equirectangular);
    let wind = fx.wind_file();
    let o = &fx.orchestrator;
    o.load_layers(LayerRequest::new(wind, Product::Wind), None);
    o.settle().await;
    o.rebuild_field().unwrap();
    o.settle().await;

    // Runs until cancelled.
    let field = o.field().value().unwrap();
    let sink = PngFrameSink::new(fx.output.path(), field.overlay().rgba().to_vec(), 1000, 0);
    o.start_animation(sink).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    o.rebuild_field().unwrap();
    o.settle().await;
    assert!(o.animation().value().is_none());
    assert!(o.field().value().is_some());
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_missing_component_is_sticky() {
    let mut fx = Fixture::new(ProjectionKind::Orthographic);
    let temp_only = fx.file(&[temperature_record(&global_10deg())]);
    let o = &fx.orchestrator;

    o.load_layers(LayerRequest::new(temp_only, Product::Wind), None);
    o.settle().await;

    let snap = o.status().snapshot();
    assert_eq!(snap.level, StatusLevel::Error);
    assert!(snap.message.contains("Missing u component"), "{}", snap.message);
    assert!(o.primary().value().is_none());

    // Nothing to interpolate.
    assert!(matches!(o.rebuild_field(), Err(EarthError::InvalidConfig(_))));
    assert!(o.status().is_error());

    o.status().reset();
    let wind = fx.wind_file();
    let o = &fx.orchestrator;
    o.load_layers(LayerRequest::new(wind, Product::Wind), None);
    o.settle().await;
    assert!(!o.status().is_error());
}

#[tokio::test]
async fn test_unreadable_file_fails_to_load() {
    let fx = Fixture::new(ProjectionKind::Orthographic);
    let o = &fx.orchestrator;
    o.load_layers(LayerRequest::new("/nonexistent/grid.json", Product::Wind), None);
    o.settle().await;
    assert_eq!(o.status().snapshot().message, "Failed to load data");
}

#[tokio::test]
async fn test_scalar_primary_cannot_animate() {
    let mut fx = Fixture::new(ProjectionKind::Orthographic);
    let temp = fx.file(&[temperature_record(&global_10deg())]);
    let o = &fx.orchestrator;
    o.load_layers(LayerRequest::new(temp, Product::Temperature), None);
    o.settle().await;
    assert!(o.primary().value().is_some());

    assert!(o.rebuild_field().is_err());
    assert_eq!(o.status().snapshot().source.as_deref(), Some("field"));
}

// ============================================================================
// Inspection
// ============================================================================

#[tokio::test]
async fn test_inspect_reports_primary_and_overlay() {
    let mut fx = Fixture::new(ProjectionKind::Equirectangular);
    let wind = fx.wind_file();
    let temp = fx.file(&[temperature_record(&global_10deg())]);
    let o = &fx.orchestrator;
    o.load_layers(
        LayerRequest::new(wind, Product::Wind),
        Some(LayerRequest::new(temp, Product::Temperature)),
    );
    o.settle().await;

    let (cx, cy) = o.config().view().center();
    let point = o.inspect(cx, cy).expect("center is on the map");
    assert!(point.lon.abs() < 5.0 && point.lat.abs() < 5.0);

    let primary = point.primary.unwrap();
    assert!(matches!(primary.sample, Sample::Vector { .. }));
    assert_eq!(primary.text, "270° @ 36 km/h");

    let overlay = point.overlay.unwrap();
    assert!(matches!(overlay.sample, Sample::Scalar(_)));
    assert!(overlay.text.ends_with("°C"));

    // Outside the map.
    assert!(o.inspect(0.0, 0.0).is_none());
}
