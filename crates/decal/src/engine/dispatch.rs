//! UI message handling

use atelier_ipc::{EngineToUi, UiToEngine};
use glam::Vec2;
use tracing::debug;

use crate::loader::GarmentLoader;
use crate::scene::SceneAttachable;

use super::EngineState;

impl<S: SceneAttachable> EngineState<S> {
    /// Apply one UI message and return the notifications it produced.
    ///
    /// Messages are handled one at a time, in arrival order.
    pub async fn dispatch<L: GarmentLoader>(&mut self, loader: &L, message: UiToEngine) -> Vec<EngineToUi> {
        debug!("Dispatching {:?}", message);
        match message {
            UiToEngine::SwitchGarment { garment } => {
                let finish_before = self.materials.finish;
                match self.switch_garment(loader, garment).await {
                    Ok(_) => {
                        let sub_meshes = self.garment.as_ref().map_or(0, |g| g.sub_meshes().len());
                        let mut out = vec![EngineToUi::GarmentLoaded { garment, sub_meshes }];
                        if self.materials.finish != finish_before {
                            out.push(EngineToUi::FinishChanged {
                                finish: self.materials.finish,
                            });
                        }
                        out
                    }
                    Err(e) => vec![EngineToUi::LoadFailed {
                        garment,
                        message: e.to_string(),
                    }],
                }
            }
            UiToEngine::SetColor { color } => match self.set_color_hex(&color) {
                Ok(color) => vec![EngineToUi::ColorChanged { color: color.to_hex() }],
                Err(e) => vec![EngineToUi::Error {
                    code: "invalid_color".to_string(),
                    message: e.to_string(),
                }],
            },
            UiToEngine::SetFinish { finish } => {
                self.set_finish(finish);
                vec![EngineToUi::FinishChanged { finish }]
            }
            UiToEngine::ClearDecals => {
                self.clear_all();
                vec![EngineToUi::DecalsCleared]
            }
            UiToEngine::RemoveImages => {
                self.remove_images();
                vec![EngineToUi::ImageRemoved]
            }
            UiToEngine::Click { x, y } => match self.click(Vec2::new(x, y)) {
                Some(_) => vec![EngineToUi::DecalApplied {
                    decal_count: self.decals.len(),
                }],
                None => Vec::new(),
            },
            UiToEngine::Drag { delta_x } => {
                self.rotate_garment(delta_x);
                Vec::new()
            }
            UiToEngine::ViewportResized(viewport) => {
                self.set_viewport(viewport);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::front_panel;
    use crate::loader::MemoryLoader;
    use crate::texture::TextureHandle;
    use atelier_config::EngineConfig;
    use atelier_ipc::{Finish, GarmentKind, ViewportRect};

    fn loader() -> MemoryLoader {
        MemoryLoader::new().with("/models/wif.glb", front_panel(0.5))
    }

    #[tokio::test]
    async fn test_session_flow() {
        let loader = loader();
        let mut engine = EngineState::new(EngineConfig::default()).unwrap();

        let out = engine
            .dispatch(&loader, UiToEngine::SwitchGarment { garment: GarmentKind::TShirt })
            .await;
        assert_eq!(
            out,
            vec![EngineToUi::GarmentLoaded {
                garment: GarmentKind::TShirt,
                sub_meshes: 1
            }]
        );

        let viewport = ViewportRect::new(0.0, 0.0, 800.0, 600.0);
        assert!(engine
            .dispatch(&loader, UiToEngine::ViewportResized(viewport))
            .await
            .is_empty());

        // No image yet
        let click = UiToEngine::Click { x: 400.0, y: 300.0 };
        assert!(engine.dispatch(&loader, click.clone()).await.is_empty());

        engine.set_uploaded_texture(TextureHandle::new("logo", 8, 8));
        let out = engine.dispatch(&loader, click.clone()).await;
        assert_eq!(out, vec![EngineToUi::DecalApplied { decal_count: 1 }]);
        let out = engine.dispatch(&loader, click).await;
        assert_eq!(out, vec![EngineToUi::DecalApplied { decal_count: 2 }]);

        let out = engine
            .dispatch(&loader, UiToEngine::SetColor { color: "#00FF00".to_string() })
            .await;
        assert_eq!(out, vec![EngineToUi::ColorChanged { color: "#00ff00".to_string() }]);
        assert_eq!(engine.decals().len(), 2);

        let out = engine.dispatch(&loader, UiToEngine::ClearDecals).await;
        assert_eq!(out, vec![EngineToUi::DecalsCleared]);
        assert!(engine.decals().is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_reported() {
        let loader = loader();
        let mut engine = EngineState::new(EngineConfig::default()).unwrap();

        let out = engine
            .dispatch(&loader, UiToEngine::SwitchGarment { garment: GarmentKind::Polo })
            .await;
        assert!(matches!(
            out.as_slice(),
            [EngineToUi::LoadFailed {
                garment: GarmentKind::Polo,
                ..
            }]
        ));
        assert!(engine.garment().is_none());

        let out = engine
            .dispatch(&loader, UiToEngine::SetColor { color: "blue".to_string() })
            .await;
        assert!(matches!(out.as_slice(), [EngineToUi::Error { code, .. }] if code == "invalid_color"));
    }

    #[tokio::test]
    async fn test_reload_reports_finish_reset() {
        let loader = loader();
        let mut engine = EngineState::new(EngineConfig::default()).unwrap();
        engine
            .dispatch(&loader, UiToEngine::SetFinish { finish: Finish::Cotton })
            .await;

        let out = engine
            .dispatch(&loader, UiToEngine::SwitchGarment { garment: GarmentKind::TShirt })
            .await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[1], EngineToUi::FinishChanged { finish: Finish::Normal });
    }

    #[tokio::test]
    async fn test_remove_images_and_drag() {
        let loader = loader();
        let mut engine = EngineState::new(EngineConfig::default()).unwrap();
        engine
            .dispatch(&loader, UiToEngine::SwitchGarment { garment: GarmentKind::TShirt })
            .await;
        engine.set_uploaded_texture(TextureHandle::new("logo", 8, 8));

        assert!(engine.dispatch(&loader, UiToEngine::Drag { delta_x: 50.0 }).await.is_empty());
        assert!((engine.garment().unwrap().root().rotation.y - 0.25).abs() < 1e-6);

        let out = engine.dispatch(&loader, UiToEngine::RemoveImages).await;
        assert_eq!(out, vec![EngineToUi::ImageRemoved]);
        assert!(engine.texture().is_none());
    }
}
