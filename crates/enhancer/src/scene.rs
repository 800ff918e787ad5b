//! Host scene stand-in and explicit entity lookup.

use mesh::Mesh;
use rig_core::{EntityKind, RigError, RigResult};
use serde::{Deserialize, Serialize};
use skeleton::Skeleton;
use spring::SpringBoneConfig;

/// Armature object with its spring-bone extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Armature {
    pub skeleton: Skeleton,
    #[serde(default)]
    pub spring_bones: SpringBoneConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub armatures: Vec<Armature>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
}

/// Indices of the entities an operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RigHandles {
    pub armature: usize,
    /// Mesh parented to the armature, if there is one.
    pub mesh: Option<usize>,
}

/// Mutable view over the resolved entities.
pub struct RigContext<'a> {
    pub skeleton: &'a mut Skeleton,
    pub spring_bones: &'a mut SpringBoneConfig,
    pub mesh: Option<&'a mut Mesh>,
}

impl RigContext<'_> {
    /// The mesh, or a recoverable error naming what was expected.
    pub fn require_mesh(&mut self) -> RigResult<&mut Mesh> {
        self.skeleton_and_mesh().map(|(_, mesh)| mesh)
    }

    /// Read access to the skeleton alongside write access to the mesh.
    pub fn skeleton_and_mesh(&mut self) -> RigResult<(&Skeleton, &mut Mesh)> {
        match self.mesh.as_deref_mut() {
            Some(mesh) => Ok((&*self.skeleton, mesh)),
            None => Err(RigError::missing(
                EntityKind::Mesh,
                format!("child of '{}'", self.skeleton.name),
            )),
        }
    }
}

/// Resolves which armature and mesh an operation targets.
#[derive(Debug, Clone, Default)]
pub struct ObjectLookup {
    /// Armature to use; the first armature when unset.
    pub armature: Option<String>,
}

impl ObjectLookup {
    pub fn named(armature: impl Into<String>) -> Self {
        Self {
            armature: Some(armature.into()),
        }
    }

    pub fn resolve(&self, scene: &Scene) -> RigResult<RigHandles> {
        let armature = match &self.armature {
            Some(name) => scene
                .armatures
                .iter()
                .position(|a| &a.skeleton.name == name)
                .ok_or_else(|| RigError::missing(EntityKind::Armature, name.clone()))?,
            None if scene.armatures.is_empty() => {
                return Err(RigError::missing(EntityKind::Armature, "<any>"));
            }
            None => 0,
        };
        let name = &scene.armatures[armature].skeleton.name;
        let mesh = scene
            .meshes
            .iter()
            .position(|m| m.parent.as_deref() == Some(name.as_str()));
        Ok(RigHandles { armature, mesh })
    }
}

impl Scene {
    pub fn context(&mut self, handles: RigHandles) -> RigResult<RigContext<'_>> {
        let armature = self
            .armatures
            .get_mut(handles.armature)
            .ok_or_else(|| RigError::unexpected("stale armature handle"))?;
        let mesh = match handles.mesh {
            Some(i) => Some(
                self.meshes
                    .get_mut(i)
                    .ok_or_else(|| RigError::unexpected("stale mesh handle"))?,
            ),
            None => None,
        };
        Ok(RigContext {
            skeleton: &mut armature.skeleton,
            spring_bones: &mut armature.spring_bones,
            mesh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene {
            armatures: vec![
                Armature {
                    skeleton: Skeleton::new("Body"),
                    ..Default::default()
                },
                Armature {
                    skeleton: Skeleton::new("Prop"),
                    ..Default::default()
                },
            ],
            meshes: vec![
                Mesh::grid("PropMesh", 1, 1, 1.0).with_parent("Prop"),
                Mesh::grid("BodyMesh", 1, 1, 1.0).with_parent("Body"),
            ],
        }
    }

    #[test]
    fn default_lookup_takes_first_armature_and_its_child() {
        let handles = ObjectLookup::default().resolve(&scene()).unwrap();
        assert_eq!(handles, RigHandles { armature: 0, mesh: Some(1) });
    }

    #[test]
    fn named_lookup() {
        let handles = ObjectLookup::named("Prop").resolve(&scene()).unwrap();
        assert_eq!(handles, RigHandles { armature: 1, mesh: Some(0) });
        assert!(ObjectLookup::named("Nope").resolve(&scene()).is_err());
    }

    #[test]
    fn missing_child_mesh_is_none() {
        let mut s = scene();
        s.meshes.clear();
        let handles = ObjectLookup::default().resolve(&s).unwrap();
        assert_eq!(handles.mesh, None);
        let mut ctx = s.context(handles).unwrap();
        assert!(ctx.require_mesh().unwrap_err().is_recoverable());
    }

    #[test]
    fn empty_scene_has_no_armature() {
        assert!(ObjectLookup::default().resolve(&Scene::default()).is_err());
    }
}
