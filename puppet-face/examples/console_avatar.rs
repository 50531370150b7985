//! Console avatar example
//!
//! Type a message, watch the coordinator drive a headless rig.
//! Usage: cargo run -p puppet-face --example console_avatar [settings.toml]

use puppet_face::morph::VISEMES;
use puppet_face::{
    AnimationCoordinator, AvatarAnimator, CoordinatorEvent, Mesh, PuppetSettings, SceneGraph,
    TextEmotionClassifier,
};
use puppet_llm::FallbackResponder;
use puppet_spk::{ScriptedEngine, SpeechPlayer};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

fn headless_rig() -> SceneGraph {
    let mut morphs: Vec<&str> = VISEMES.to_vec();
    morphs.extend(["jawOpen", "mouthSmileLeft", "mouthSmileRight", "browInnerUp"]);
    SceneGraph::new(vec![Mesh::with_morphs("Head", &morphs).skinned(&[
        "RightArm",
        "RightForeArm",
        "RightHand",
        "LeftArm",
        "LeftForeArm",
        "LeftHand",
    ])])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => PuppetSettings::load(path)?,
        None => PuppetSettings::default(),
    };

    let engine = Arc::new(ScriptedEngine::new());
    let player = Arc::new(SpeechPlayer::new(settings.speech.clone(), engine)?);
    player.load_voices().await?;
    let responder = Arc::new(FallbackResponder::from_config(&settings.generation)?);

    let coordinator = AnimationCoordinator::new(
        settings.avatar.clone(),
        Arc::new(TextEmotionClassifier::new()),
        player,
        responder,
    )?;

    for entry in coordinator.transcript() {
        println!("[{:?}] {}", entry.speaker, entry.content);
    }

    // Print transcript and speech events as they arrive
    let mut events = coordinator.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                CoordinatorEvent::Message(entry) => {
                    println!("[{:?}] {}", entry.speaker, entry.content)
                }
                CoordinatorEvent::SpeechStarted { .. } => println!("  (speaking)"),
                CoordinatorEvent::SpeechEnded { outcome, .. } => println!("  (done: {:?})", outcome),
                CoordinatorEvent::Recovered { reason } => println!("  (recovered: {})", reason),
                _ => {}
            }
        }
    });

    // 30 fps render loop against a headless rig
    let render = coordinator.clone();
    tokio::spawn(async move {
        let mut scene = headless_rig();
        let mut animator = AvatarAnimator::for_scene(&scene, render.config().base_position);
        let mut ticker = tokio::time::interval(Duration::from_millis(33));
        loop {
            ticker.tick().await;
            let snapshot = render.snapshot();
            if let Err(e) = animator.frame(&mut scene, &snapshot, 0.033) {
                tracing::warn!("Frame failed: {}", e);
            }
            if snapshot.is_speaking {
                let jaw = scene.meshes[0].influence("jawOpen").unwrap_or(0.0);
                tracing::debug!("{} mouth={:.2} jaw={:.2}", snapshot.expression, snapshot.mouth_intensity, jaw);
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "/quit" => break,
            "/stop" => {
                coordinator.cancel_speech();
            }
            text => {
                let turn = coordinator.clone();
                let text = text.to_string();
                tokio::spawn(async move {
                    turn.respond(&text).await;
                });
            }
        }
    }

    coordinator.shutdown();
    Ok(())
}
