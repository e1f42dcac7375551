//! glTF document to `Scene` conversion.
//!
//! Conversion runs in dependency order: images, materials, meshes, the node
//! tree (which also collects cameras and lights), then skins and
//! animations, which need the node names resolved.
//!
//! Coordinates follow the conventions the serializer expects from any
//! importer: texture V runs downwards (`v' = 1 - v`) and animation times are
//! expressed in ticks at 1000 ticks per second.

use glam::{Mat4, Quat, Vec3, Vec4};
use indexmap::IndexMap;
use scenejson_core::{
    blend_mode, matkey, shading_model, Animation, Bone, Camera, Color3, Color4, Face, Light,
    LightSourceType, Material, Mesh, MeshMorphAnim, MeshMorphKey, Node, NodeAnim, QuatKey, Scene,
    SceneFlags, TangentFrame, Texture, TextureBinding, TextureMapMode, TextureMapping,
    TextureType, UvChannel, VectorKey, VertexWeight, MAX_COLOR_SETS, MAX_TEXTURE_COORDS,
};

use crate::error::{ImportError, Result};

use super::accessor::{self, Buffers};
use super::reader::{data_uri_mime, decode_data_uri};
use super::schema::{self, Gltf};

const DEFAULT_MATERIAL_NAME: &str = "DefaultMaterial";
const ROOT_NODE_NAME: &str = "ROOT";
const TICKS_PER_SECOND: f64 = 1000.0;

/// Per-vertex skinning inputs, held until the owning node's skin is known.
struct SkinData {
    joints: Vec<[u32; 4]>,
    weights: Vec<Vec4>,
}

pub(super) struct Converter<'a> {
    gltf: &'a Gltf,
    buffers: &'a Buffers,
    scene: Scene,
    /// Texture path per glTF image, `None` for images without data.
    image_paths: Vec<Option<String>>,
    /// Scene mesh indices per glTF mesh, one per converted primitive.
    mesh_map: Vec<Vec<u32>>,
    /// Parallel to `scene.meshes`.
    skin_data: Vec<Option<SkinData>>,
    node_names: Vec<String>,
    default_material: Option<u32>,
}

impl<'a> Converter<'a> {
    pub fn new(gltf: &'a Gltf, buffers: &'a Buffers) -> Self {
        let node_names = gltf
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| node.name.clone().unwrap_or_else(|| format!("node_{}", i)))
            .collect();

        Self {
            gltf,
            buffers,
            scene: Scene::default(),
            image_paths: Vec::new(),
            mesh_map: Vec::new(),
            skin_data: Vec::new(),
            node_names,
            default_material: None,
        }
    }

    pub fn convert(mut self) -> Result<Scene> {
        self.convert_images()?;
        self.convert_materials();
        self.convert_meshes()?;
        self.scene.root = self.convert_hierarchy()?;
        self.apply_skins()?;
        self.convert_animations()?;

        if self.scene.meshes.is_empty() {
            self.scene.flags |= SceneFlags::INCOMPLETE;
        }
        Ok(self.scene)
    }

    /// Embedded images become compressed textures referenced as `*N`.
    /// External images keep their URI.
    fn convert_images(&mut self) -> Result<()> {
        let gltf = self.gltf;
        for (i, image) in gltf.images.iter().enumerate() {
            let embedded = match (&image.uri, image.buffer_view) {
                (Some(uri), _) if uri.starts_with("data:") => {
                    let mime = data_uri_mime(uri).or(image.mime_type.as_deref());
                    Some((decode_data_uri(uri)?, mime))
                }
                (Some(uri), _) => {
                    self.image_paths.push(Some(uri.clone()));
                    continue;
                }
                (None, Some(view)) => {
                    let bytes = accessor::view_bytes(gltf, self.buffers, view)?.to_vec();
                    Some((bytes, image.mime_type.as_deref()))
                }
                (None, None) => None,
            };

            let path = embedded.map(|(bytes, mime)| {
                let texture = Texture::compressed(format_hint(mime, &bytes), &bytes);
                format!("*{}", self.scene.add_texture(texture))
            });
            if path.is_none() {
                log::warn!("image {} has neither a URI nor a buffer view", i);
            }
            self.image_paths.push(path);
        }
        Ok(())
    }

    fn convert_materials(&mut self) {
        let gltf = self.gltf;
        for source in &gltf.materials {
            let mut material = Material::new();
            if let Some(name) = &source.name {
                material.set_string(matkey::NAME, name);
            }

            let pbr = source.pbr_metallic_roughness.clone().unwrap_or_default();
            let base = pbr.base_color_factor;
            material.set_color(matkey::COLOR_DIFFUSE, Color4::from(base));
            material.set_float(matkey::OPACITY, base[3]);
            material.set_color(
                matkey::COLOR_EMISSIVE,
                Color4::from_rgb(Color3::from(source.emissive_factor), 1.0),
            );
            material.set_integer(matkey::TWOSIDED, i32::from(source.double_sided));
            material.set_integer(matkey::SHADING_MODEL, shading_model::PBR_BRDF);
            if source.alpha_mode == "BLEND" {
                material.set_integer(matkey::BLEND_FUNC, blend_mode::DEFAULT);
            }

            let slots = [
                (TextureType::Diffuse, &pbr.base_color_texture),
                (TextureType::Unknown, &pbr.metallic_roughness_texture),
                (TextureType::Normals, &source.normal_texture),
                (TextureType::Lightmap, &source.occlusion_texture),
                (TextureType::Emissive, &source.emissive_texture),
            ];
            for (ty, info) in slots {
                if let Some(info) = info {
                    self.bind_texture(&mut material, ty, info.index, info.tex_coord);
                }
            }

            self.scene.add_material(material);
        }

        if gltf.materials.is_empty() {
            self.default_material();
        }
    }

    fn bind_texture(&self, material: &mut Material, ty: TextureType, index: usize, tex_coord: u32) {
        let Some(texture) = self.gltf.textures.get(index) else {
            log::warn!("material references missing texture {}", index);
            return;
        };
        let Some(path) = texture
            .source
            .and_then(|source| self.image_paths.get(source))
            .and_then(Option::as_ref)
        else {
            log::warn!("texture {} has no usable image", index);
            return;
        };

        let sampler = texture.sampler.and_then(|s| self.gltf.samplers.get(s));
        let wrap_s = sampler.map_or(schema::WRAP_REPEAT, |s| s.wrap_s);
        let wrap_t = sampler.map_or(schema::WRAP_REPEAT, |s| s.wrap_t);

        let mut binding = TextureBinding::new(path.as_str());
        binding.mapping = Some(TextureMapping::Uv);
        binding.uv_index = Some(tex_coord);
        binding.map_modes = [Some(map_mode(wrap_s)), Some(map_mode(wrap_t)), None];
        material.add_texture(ty, &binding);
    }

    /// Index of the fallback material, created on first use.
    fn default_material(&mut self) -> u32 {
        if let Some(index) = self.default_material {
            return index;
        }

        let mut material = Material::named(DEFAULT_MATERIAL_NAME);
        material.set_color(matkey::COLOR_DIFFUSE, Color4::new(0.6, 0.6, 0.6, 1.0));
        material.set_integer(matkey::SHADING_MODEL, shading_model::GOURAUD);
        let index = self.scene.add_material(material);
        self.default_material = Some(index);
        index
    }

    fn convert_meshes(&mut self) -> Result<()> {
        let gltf = self.gltf;
        for (m, source) in gltf.meshes.iter().enumerate() {
            let base_name = source.name.clone().unwrap_or_else(|| format!("mesh_{}", m));
            let mut indices = Vec::with_capacity(source.primitives.len());

            for (p, primitive) in source.primitives.iter().enumerate() {
                let name = if source.primitives.len() > 1 {
                    format!("{}-{}", base_name, p)
                } else {
                    base_name.clone()
                };

                if let Some((mesh, skin)) = self.convert_primitive(&name, primitive)? {
                    indices.push(self.scene.add_mesh(mesh));
                    self.skin_data.push(skin);
                }
            }

            self.mesh_map.push(indices);
        }
        Ok(())
    }

    fn convert_primitive(
        &mut self,
        name: &str,
        primitive: &schema::Primitive,
    ) -> Result<Option<(Mesh, Option<SkinData>)>> {
        let (gltf, buffers) = (self.gltf, self.buffers);
        let attribute = |key: &str| primitive.attributes.get(key).copied();

        let Some(position_accessor) = attribute("POSITION") else {
            log::warn!("primitive {} has no POSITION attribute, skipped", name);
            return Ok(None);
        };

        let mut mesh = Mesh::new(name);
        let positions = accessor::read_vec3(gltf, buffers, position_accessor)?;
        let count = positions.len();
        mesh.positions = Some(positions);

        if let Some(a) = attribute("NORMAL") {
            let normals = accessor::read_vec3(gltf, buffers, a)?;
            check_len(name, "NORMAL", normals.len(), count)?;
            mesh.normals = Some(normals);
        }

        if let (Some(a), Some(normals)) = (attribute("TANGENT"), &mesh.normals) {
            let raw = accessor::read_vec4(gltf, buffers, a)?;
            check_len(name, "TANGENT", raw.len(), count)?;
            let tangents: Vec<Vec3> = raw.iter().map(|t| t.truncate()).collect();
            let bitangents = normals
                .iter()
                .zip(&raw)
                .map(|(n, t)| n.cross(t.truncate()) * t.w)
                .collect();
            mesh.tangent_frame = Some(TangentFrame { tangents, bitangents });
        }

        for channel in 0..MAX_TEXTURE_COORDS {
            let Some(a) = attribute(&format!("TEXCOORD_{}", channel)) else {
                continue;
            };
            let uvs = accessor::read_vec2(gltf, buffers, a)?;
            check_len(name, "TEXCOORD", uvs.len(), count)?;
            let coords = uvs.iter().map(|uv| Vec3::new(uv.x, 1.0 - uv.y, 0.0)).collect();
            mesh.texture_coords[channel] = Some(UvChannel::new(2, coords));
        }

        for channel in 0..MAX_COLOR_SETS {
            let Some(a) = attribute(&format!("COLOR_{}", channel)) else {
                continue;
            };
            let colors = accessor::read_colors(gltf, buffers, a)?;
            check_len(name, "COLOR", colors.len(), count)?;
            mesh.colors[channel] = Some(
                colors
                    .iter()
                    .map(|c| Color4::new(c.x, c.y, c.z, c.w))
                    .collect(),
            );
        }

        let vertex_indices = match primitive.indices {
            Some(a) => accessor::read_indices(gltf, buffers, a)?,
            None => (0..count as u32).collect(),
        };
        if let Some(&bad) = vertex_indices.iter().find(|&&i| i as usize >= count) {
            return Err(ImportError::InvalidData(format!(
                "primitive {}: index {} out of range for {} vertices",
                name, bad, count
            )));
        }
        mesh.faces = faces_for_mode(primitive.mode, &vertex_indices)?;
        mesh.update_primitive_types();

        mesh.material_index = match primitive.material {
            Some(index) if index < gltf.materials.len() => index as u32,
            Some(index) => {
                return Err(ImportError::InvalidData(format!(
                    "primitive {}: invalid material {}",
                    name, index
                )))
            }
            None => self.default_material(),
        };

        let skin = match (attribute("JOINTS_0"), attribute("WEIGHTS_0")) {
            (Some(j), Some(w)) => {
                let joints = accessor::read_joints(gltf, buffers, j)?;
                let weights = accessor::read_vec4(gltf, buffers, w)?;
                check_len(name, "JOINTS_0", joints.len(), count)?;
                check_len(name, "WEIGHTS_0", weights.len(), count)?;
                Some(SkinData { joints, weights })
            }
            _ => None,
        };

        Ok(Some((mesh, skin)))
    }

    fn convert_hierarchy(&mut self) -> Result<Node> {
        let gltf = self.gltf;
        let roots: Vec<usize> = match gltf.scenes.get(gltf.scene.unwrap_or(0)) {
            Some(scene) => scene.nodes.clone(),
            None => {
                // No scene defined, use all nodes without parents as roots
                let mut has_parent = vec![false; gltf.nodes.len()];
                for node in &gltf.nodes {
                    for &child in &node.children {
                        if let Some(flag) = has_parent.get_mut(child) {
                            *flag = true;
                        }
                    }
                }
                (0..gltf.nodes.len()).filter(|&i| !has_parent[i]).collect()
            }
        };

        let mut visited = vec![false; gltf.nodes.len()];
        let mut nodes = roots
            .iter()
            .map(|&i| self.convert_node(i, &mut visited))
            .collect::<Result<Vec<_>>>()?;

        if nodes.len() == 1 {
            if let Some(root) = nodes.pop() {
                return Ok(root);
            }
        }

        let mut root = Node::new(ROOT_NODE_NAME);
        root.children = nodes;
        Ok(root)
    }

    fn convert_node(&mut self, index: usize, visited: &mut [bool]) -> Result<Node> {
        let gltf = self.gltf;
        let source = gltf
            .nodes
            .get(index)
            .ok_or_else(|| ImportError::InvalidData(format!("invalid node {}", index)))?;

        // A node may have at most one parent, so a second visit means the
        // hierarchy is not a tree.
        if std::mem::replace(&mut visited[index], true) {
            return Err(ImportError::InvalidData(format!(
                "node {} appears more than once in the hierarchy",
                index
            )));
        }

        let name = self.node_names[index].clone();
        let mut node = Node::new(name.as_str()).transformed(node_transform(source));

        if let Some(m) = source.mesh {
            node.meshes = self
                .mesh_map
                .get(m)
                .cloned()
                .ok_or_else(|| ImportError::InvalidData(format!("invalid mesh {}", m)))?;
        }
        if let Some(camera) = source.camera {
            self.add_camera(camera, &name)?;
        }
        if let Some(light) = &source.extensions.lights_punctual {
            self.add_light(light.light, &name)?;
        }

        for &child in &source.children {
            let child = self.convert_node(child, visited)?;
            node.children.push(child);
        }

        Ok(node)
    }

    /// Cameras are named after the node that places them.
    fn add_camera(&mut self, index: usize, node_name: &str) -> Result<()> {
        let source = self
            .gltf
            .cameras
            .get(index)
            .ok_or_else(|| ImportError::InvalidData(format!("invalid camera {}", index)))?;

        let mut camera = Camera::new(node_name);
        match (&source.perspective, &source.orthographic) {
            (Some(p), _) => {
                let aspect = p.aspect_ratio.unwrap_or(0.0);
                camera.aspect = aspect;
                camera.horizontal_fov = if aspect > 0.0 {
                    2.0 * (aspect * (p.yfov * 0.5).tan()).atan()
                } else {
                    p.yfov
                };
                camera.clip_plane_near = p.znear;
                if let Some(zfar) = p.zfar {
                    camera.clip_plane_far = zfar;
                }
            }
            (None, Some(o)) => {
                camera.orthographic_width = o.xmag;
                camera.aspect = if o.ymag != 0.0 { o.xmag / o.ymag } else { 0.0 };
                camera.horizontal_fov = 0.0;
                camera.clip_plane_near = o.znear;
                camera.clip_plane_far = o.zfar;
            }
            (None, None) => {
                log::warn!("camera {} has no projection, using defaults", index);
            }
        }

        self.scene.cameras.push(camera);
        Ok(())
    }

    /// `KHR_lights_punctual` lights, named after the node that places them.
    fn add_light(&mut self, index: usize, node_name: &str) -> Result<()> {
        let source = self
            .gltf
            .extensions
            .lights_punctual
            .as_ref()
            .and_then(|ext| ext.lights.get(index))
            .ok_or_else(|| ImportError::InvalidData(format!("invalid light {}", index)))?;

        let light_type = match source.light_type.as_str() {
            "directional" => LightSourceType::Directional,
            "point" => LightSourceType::Point,
            "spot" => LightSourceType::Spot,
            other => {
                log::warn!("unknown light type {}", other);
                LightSourceType::Undefined
            }
        };

        let mut light = Light::new(node_name, light_type);
        let [r, g, b] = source.color.map(|c| c * source.intensity);
        light.color_diffuse = Color3::new(r, g, b);
        light.color_specular = light.color_diffuse;

        match light_type {
            LightSourceType::Directional => {
                light.attenuation_constant = 1.0;
                light.attenuation_linear = 0.0;
                light.attenuation_quadratic = 0.0;
            }
            _ => {
                light.attenuation_constant = 0.0;
                light.attenuation_linear = 0.0;
                light.attenuation_quadratic = 1.0;
            }
        }

        if light_type == LightSourceType::Spot {
            let (inner, outer) = source
                .spot
                .as_ref()
                .map_or((0.0, std::f32::consts::FRAC_PI_4), |s| {
                    (s.inner_cone_angle, s.outer_cone_angle)
                });
            light.angle_inner_cone = inner;
            light.angle_outer_cone = outer;
        }

        self.scene.lights.push(light);
        Ok(())
    }

    /// Attach bones to every mesh instanced by a skinned node. The first skin
    /// to reach a mesh wins.
    fn apply_skins(&mut self) -> Result<()> {
        let gltf = self.gltf;
        for node in &gltf.nodes {
            let (Some(m), Some(s)) = (node.mesh, node.skin) else {
                continue;
            };
            let skin = gltf
                .skins
                .get(s)
                .ok_or_else(|| ImportError::InvalidData(format!("invalid skin {}", s)))?;

            let inverse_binds = match skin.inverse_bind_matrices {
                Some(a) => accessor::read_mat4(gltf, self.buffers, a)?,
                None => vec![Mat4::IDENTITY; skin.joints.len()],
            };
            if inverse_binds.len() < skin.joints.len() {
                return Err(ImportError::InvalidData(format!(
                    "skin {} has {} inverse bind matrices for {} joints",
                    s,
                    inverse_binds.len(),
                    skin.joints.len()
                )));
            }

            let targets = self.mesh_map.get(m).cloned().unwrap_or_default();
            for mesh_index in targets {
                let Some(data) = self.skin_data[mesh_index as usize].take() else {
                    continue;
                };
                let bones = self.build_bones(skin, &inverse_binds, &data)?;
                self.scene.meshes[mesh_index as usize].bones = bones;
            }
        }
        Ok(())
    }

    /// One bone per joint that influences at least one vertex.
    fn build_bones(
        &self,
        skin: &schema::Skin,
        inverse_binds: &[Mat4],
        data: &SkinData,
    ) -> Result<Vec<Bone>> {
        let mut bones = skin
            .joints
            .iter()
            .zip(inverse_binds)
            .map(|(&joint, offset)| {
                self.node_names
                    .get(joint)
                    .map(|name| Bone::new(name.as_str(), *offset))
                    .ok_or_else(|| ImportError::InvalidData(format!("invalid joint node {}", joint)))
            })
            .collect::<Result<Vec<_>>>()?;

        for (vertex, (joints, weights)) in data.joints.iter().zip(&data.weights).enumerate() {
            for (k, &joint) in joints.iter().enumerate() {
                let weight = weights[k];
                if weight <= 0.0 {
                    continue;
                }
                let bone = bones.get_mut(joint as usize).ok_or_else(|| {
                    ImportError::InvalidData(format!("vertex {} references joint {}", vertex, joint))
                })?;
                bone.weights.push(VertexWeight {
                    vertex_id: vertex as u32,
                    weight,
                });
            }
        }

        bones.retain(|bone| !bone.weights.is_empty());
        Ok(bones)
    }

    fn convert_animations(&mut self) -> Result<()> {
        let (gltf, buffers) = (self.gltf, self.buffers);
        for (i, source) in gltf.animations.iter().enumerate() {
            let name = source.name.clone().unwrap_or_else(|| format!("animation_{}", i));
            let mut animation = Animation::new(name.as_str());
            animation.ticks_per_second = TICKS_PER_SECOND;

            // Tracks for one node are merged, in order of first appearance.
            let mut node_channels: IndexMap<usize, NodeAnim> = IndexMap::new();

            for channel in &source.channels {
                let Some(target) = channel.target.node else {
                    continue;
                };
                let node_name = self
                    .node_names
                    .get(target)
                    .ok_or_else(|| ImportError::InvalidData(format!("invalid node {}", target)))?;
                let sampler = source.samplers.get(channel.sampler).ok_or_else(|| {
                    ImportError::InvalidData(format!("invalid animation sampler {}", channel.sampler))
                })?;

                let times = accessor::read_scalars(gltf, buffers, sampler.input)?;
                let (_, values) = accessor::read_floats(gltf, buffers, sampler.output)?;
                let keys = keyframes(&times, &values, sampler.interpolation == "CUBICSPLINE")?;
                if let Some((last, _)) = keys.last() {
                    animation.duration = animation.duration.max(*last);
                }

                let path = channel.target.path.as_str();
                if path == "weights" {
                    animation.morph_mesh_channels.push(MeshMorphAnim {
                        name: node_name.as_str().into(),
                        keys: keys
                            .iter()
                            .map(|&(time, v)| MeshMorphKey {
                                time,
                                values: (0..v.len() as u32).collect(),
                                weights: v.iter().map(|&w| f64::from(w)).collect(),
                            })
                            .collect(),
                    });
                    continue;
                }

                let track = node_channels.entry(target).or_insert_with(|| NodeAnim {
                    node_name: node_name.as_str().into(),
                    ..Default::default()
                });
                match path {
                    "translation" => {
                        check_width(&name, path, &keys, 3)?;
                        track.position_keys = vector_keys(&keys);
                    }
                    "scale" => {
                        check_width(&name, path, &keys, 3)?;
                        track.scaling_keys = vector_keys(&keys);
                    }
                    "rotation" => {
                        check_width(&name, path, &keys, 4)?;
                        track.rotation_keys = keys
                            .iter()
                            .map(|&(time, v)| {
                                QuatKey::new(time, Quat::from_xyzw(v[0], v[1], v[2], v[3]).normalize())
                            })
                            .collect();
                    }
                    other => log::warn!("animation {}: unknown target path {}", name, other),
                }
            }

            animation.channels = node_channels.into_values().collect();
            self.scene.animations.push(animation);
        }
        Ok(())
    }
}

fn check_len(mesh: &str, attribute: &str, len: usize, count: usize) -> Result<()> {
    if len == count {
        Ok(())
    } else {
        Err(ImportError::InvalidData(format!(
            "primitive {}: {} has {} elements, expected {}",
            mesh, attribute, len, count
        )))
    }
}

fn check_width(animation: &str, path: &str, keys: &[(f64, &[f32])], width: usize) -> Result<()> {
    match keys.first() {
        Some((_, v)) if v.len() != width => Err(ImportError::InvalidData(format!(
            "animation {}: {} keys have {} components, expected {}",
            animation,
            path,
            v.len(),
            width
        ))),
        _ => Ok(()),
    }
}

/// Local transform from either the matrix or the TRS properties.
fn node_transform(node: &schema::Node) -> Mat4 {
    if let Some(matrix) = &node.matrix {
        return Mat4::from_cols_array(matrix);
    }

    let translation = node.translation.map(Vec3::from).unwrap_or(Vec3::ZERO);
    let rotation = node
        .rotation
        .map(|r| Quat::from_xyzw(r[0], r[1], r[2], r[3]))
        .unwrap_or(Quat::IDENTITY);
    let scale = node.scale.map(Vec3::from).unwrap_or(Vec3::ONE);

    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Split sampler output into one value slice per key, with times in ticks.
/// Cubic spline keys carry `[in_tangent, value, out_tangent]`; only the
/// value is kept.
fn keyframes<'v>(times: &[f32], values: &'v [f32], cubic: bool) -> Result<Vec<(f64, &'v [f32])>> {
    if times.is_empty() {
        return Ok(Vec::new());
    }

    let slots = if cubic { 3 } else { 1 };
    let per_key = times.len() * slots;
    if values.len() % per_key != 0 {
        return Err(ImportError::InvalidData(format!(
            "animation sampler has {} output values for {} keys",
            values.len(),
            times.len()
        )));
    }

    let width = values.len() / per_key;
    let value_slot = if cubic { 1 } else { 0 };
    Ok(times
        .iter()
        .enumerate()
        .map(|(k, &t)| {
            let start = (k * slots + value_slot) * width;
            (f64::from(t) * TICKS_PER_SECOND, &values[start..start + width])
        })
        .collect())
}

fn vector_keys(keys: &[(f64, &[f32])]) -> Vec<VectorKey> {
    keys.iter()
        .map(|&(time, v)| VectorKey::new(time, Vec3::from_slice(v)))
        .collect()
}

/// Faces for a primitive topology. Incomplete trailing primitives are
/// dropped.
fn faces_for_mode(mode: u32, indices: &[u32]) -> Result<Vec<Face>> {
    let faces = match mode {
        schema::MODE_POINTS => indices.iter().map(|&i| Face::new(&[i])).collect(),
        schema::MODE_LINES => indices.chunks_exact(2).map(Face::new).collect(),
        schema::MODE_LINE_STRIP => indices.windows(2).map(Face::new).collect(),
        schema::MODE_LINE_LOOP => {
            let mut faces: Vec<Face> = indices.windows(2).map(Face::new).collect();
            if let (Some(&first), Some(&last)) = (indices.first(), indices.last()) {
                if indices.len() > 2 {
                    faces.push(Face::new(&[last, first]));
                }
            }
            faces
        }
        schema::MODE_TRIANGLES => indices.chunks_exact(3).map(Face::new).collect(),
        schema::MODE_TRIANGLE_STRIP => indices
            .windows(3)
            .enumerate()
            .map(|(i, w)| {
                // Every other triangle flips to keep a consistent winding.
                if i % 2 == 0 {
                    Face::triangle(w[0], w[1], w[2])
                } else {
                    Face::triangle(w[1], w[0], w[2])
                }
            })
            .collect(),
        schema::MODE_TRIANGLE_FAN => match indices.split_first() {
            Some((&center, rest)) => rest
                .windows(2)
                .map(|w| Face::triangle(center, w[0], w[1]))
                .collect(),
            None => Vec::new(),
        },
        other => {
            return Err(ImportError::Unsupported(format!("primitive mode {}", other)));
        }
    };
    Ok(faces)
}

fn map_mode(wrap: u32) -> TextureMapMode {
    match wrap {
        schema::WRAP_CLAMP_TO_EDGE => TextureMapMode::Clamp,
        schema::WRAP_MIRRORED_REPEAT => TextureMapMode::Mirror,
        _ => TextureMapMode::Wrap,
    }
}

/// Short format hint for an embedded image, from its media type or, failing
/// that, its leading bytes.
fn format_hint(mime: Option<&str>, bytes: &[u8]) -> &'static str {
    match mime {
        Some("image/png") => return "png",
        Some("image/jpeg") => return "jpg",
        Some("image/webp") => return "webp",
        Some("image/ktx2") => return "ktx2",
        _ => {}
    }

    if bytes.starts_with(b"\x89PNG") {
        "png"
    } else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        "jpg"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenejson_core::PrimitiveTypes;
    use serde_json::{json, Value};

    fn floats(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn convert(document: Value, buffers: Vec<Vec<u8>>) -> Result<Scene> {
        let gltf: Gltf = serde_json::from_value(document).unwrap();
        Converter::new(&gltf, &buffers).convert()
    }

    /// A unit quad: 4 positions, 4 UVs, 6 u16 indices.
    fn quad_buffer() -> Vec<u8> {
        let mut bytes = floats(&[
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
        ]);
        bytes.extend(floats(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.25]));
        bytes.extend([0u16, 1, 2, 0, 2, 3].iter().flat_map(|i| i.to_le_bytes()));
        bytes
    }

    fn quad_document(primitives: Value) -> Value {
        json!({
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0]}],
            "nodes": [{"mesh": 0, "name": "Quad"}],
            "meshes": [{"name": "quad", "primitives": primitives}],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3"},
                {"bufferView": 1, "componentType": 5126, "count": 4, "type": "VEC2"},
                {"bufferView": 2, "componentType": 5123, "count": 6, "type": "SCALAR"}
            ],
            "bufferViews": [
                {"buffer": 0, "byteLength": 48},
                {"buffer": 0, "byteOffset": 48, "byteLength": 32},
                {"buffer": 0, "byteOffset": 80, "byteLength": 12}
            ],
            "buffers": [{"byteLength": 92}]
        })
    }

    #[test]
    fn test_indexed_quad() {
        let scene = convert(
            quad_document(json!([{"attributes": {"POSITION": 0, "TEXCOORD_0": 1}, "indices": 2}])),
            vec![quad_buffer()],
        )
        .unwrap();

        let mesh = &scene.meshes[0];
        assert_eq!(mesh.name.to_string_lossy(), "quad");
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.faces[1].indices.as_slice(), &[0, 2, 3]);
        assert_eq!(mesh.primitive_types, PrimitiveTypes::TRIANGLE);

        let uv = mesh.texture_coords[0].as_ref().unwrap();
        assert_eq!(uv.components, 2);
        assert_eq!(uv.coords[3], Vec3::new(0.0, 0.75, 0.0));

        // No materials in the file: one default material is created.
        assert_eq!(scene.materials.len(), 1);
        assert_eq!(
            scene.materials[0].get_string(matkey::NAME).unwrap().to_string_lossy(),
            DEFAULT_MATERIAL_NAME
        );
        assert_eq!(mesh.material_index, 0);
        assert!(!scene.flags.contains(SceneFlags::INCOMPLETE));
    }

    #[test]
    fn test_multiple_primitives() {
        let scene = convert(
            quad_document(json!([
                {"attributes": {"POSITION": 0}, "indices": 2},
                {"attributes": {"POSITION": 0}, "mode": 0}
            ])),
            vec![quad_buffer()],
        )
        .unwrap();

        assert_eq!(scene.meshes.len(), 2);
        assert_eq!(scene.meshes[0].name.to_string_lossy(), "quad-0");
        assert_eq!(scene.meshes[1].name.to_string_lossy(), "quad-1");
        assert_eq!(scene.meshes[1].primitive_types, PrimitiveTypes::POINT);
        assert_eq!(scene.root.meshes, vec![0, 1]);
    }

    #[test]
    fn test_primitive_without_positions_is_skipped() {
        let scene = convert(
            quad_document(json!([{"attributes": {"TEXCOORD_0": 1}}])),
            vec![quad_buffer()],
        )
        .unwrap();

        assert!(scene.meshes.is_empty());
        assert!(scene.root.meshes.is_empty());
        assert!(scene.flags.contains(SceneFlags::INCOMPLETE));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut buffer = quad_buffer();
        let len = buffer.len();
        buffer[len - 2..].copy_from_slice(&9u16.to_le_bytes());
        let result = convert(
            quad_document(json!([{"attributes": {"POSITION": 0}, "indices": 2}])),
            vec![buffer],
        );
        assert!(matches!(result, Err(ImportError::InvalidData(_))));
    }

    #[test]
    fn test_materials_and_embedded_texture() {
        let png = b"\x89PNG\r\n\x1a\n....";
        let scene = convert(
            json!({
                "asset": {"version": "2.0"},
                "materials": [{
                    "name": "painted",
                    "pbrMetallicRoughness": {
                        "baseColorFactor": [1.0, 0.5, 0.25, 0.5],
                        "baseColorTexture": {"index": 0, "texCoord": 1}
                    },
                    "normalTexture": {"index": 1},
                    "emissiveFactor": [0.1, 0.2, 0.3],
                    "alphaMode": "BLEND",
                    "doubleSided": true
                }],
                "textures": [{"source": 0, "sampler": 0}, {"source": 1}],
                "samplers": [{"wrapS": 33071, "wrapT": 33648}],
                "images": [
                    {"bufferView": 0, "mimeType": "image/png"},
                    {"uri": "normals.png"}
                ],
                "bufferViews": [{"buffer": 0, "byteLength": 12}],
                "buffers": [{"byteLength": 12}]
            }),
            vec![png.to_vec()],
        )
        .unwrap();

        assert_eq!(scene.textures.len(), 1);
        assert_eq!(scene.textures[0].format_hint, "png");
        assert_eq!(scene.textures[0].width, 12);
        assert_eq!(scene.textures[0].height, 0);

        assert_eq!(scene.materials.len(), 1);
        let material = &scene.materials[0];
        assert_eq!(material.get_string(matkey::NAME).unwrap().to_string_lossy(), "painted");
        assert_eq!(
            material.get_color(matkey::COLOR_DIFFUSE),
            Some(Color4::new(1.0, 0.5, 0.25, 0.5))
        );
        assert_eq!(material.get_float(matkey::OPACITY), Some(0.5));
        assert_eq!(
            material.get_color(matkey::COLOR_EMISSIVE),
            Some(Color4::new(0.1, 0.2, 0.3, 1.0))
        );
        assert_eq!(material.get_integer(matkey::TWOSIDED), Some(1));
        assert_eq!(material.get_integer(matkey::BLEND_FUNC), Some(blend_mode::DEFAULT));

        let diffuse = material.get_texture(TextureType::Diffuse, 0).unwrap();
        assert_eq!(diffuse.path.to_string_lossy(), "*0");
        assert_eq!(diffuse.uv_index, Some(1));
        assert_eq!(
            diffuse.map_modes,
            [Some(TextureMapMode::Clamp), Some(TextureMapMode::Mirror), None]
        );

        let normals = material.get_texture(TextureType::Normals, 0).unwrap();
        assert_eq!(normals.path.to_string_lossy(), "normals.png");
        assert_eq!(normals.map_modes[0], Some(TextureMapMode::Wrap));
    }

    #[test]
    fn test_multiple_roots_get_synthetic_root() {
        let scene = convert(
            json!({
                "asset": {"version": "2.0"},
                "nodes": [
                    {"name": "a", "children": [2]},
                    {"translation": [1.0, 2.0, 3.0]},
                    {"name": "c"}
                ]
            }),
            vec![],
        )
        .unwrap();

        assert_eq!(scene.root.name.to_string_lossy(), ROOT_NODE_NAME);
        assert_eq!(scene.root.children.len(), 2);
        assert_eq!(scene.root.children[0].children[0].name.to_string_lossy(), "c");

        let unnamed = &scene.root.children[1];
        assert_eq!(unnamed.name.to_string_lossy(), "node_1");
        assert_eq!(
            unnamed.transformation,
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn test_cycle_is_rejected() {
        let result = convert(
            json!({
                "asset": {"version": "2.0"},
                "scenes": [{"nodes": [0]}],
                "nodes": [{"children": [1]}, {"children": [0]}]
            }),
            vec![],
        );
        assert!(matches!(result, Err(ImportError::InvalidData(_))));
    }

    #[test]
    fn test_camera_and_light() {
        let scene = convert(
            json!({
                "asset": {"version": "2.0"},
                "scenes": [{"nodes": [0, 1]}],
                "nodes": [
                    {"name": "eye", "camera": 0},
                    {"name": "lamp", "extensions": {"KHR_lights_punctual": {"light": 0}}}
                ],
                "cameras": [{
                    "type": "perspective",
                    "perspective": {"yfov": 1.0, "znear": 0.5, "aspectRatio": 1.0}
                }],
                "extensions": {"KHR_lights_punctual": {"lights": [
                    {"type": "spot", "color": [1.0, 0.5, 0.0], "intensity": 2.0,
                     "spot": {"innerConeAngle": 0.1, "outerConeAngle": 0.2}}
                ]}}
            }),
            vec![],
        )
        .unwrap();

        let camera = &scene.cameras[0];
        assert_eq!(camera.name.to_string_lossy(), "eye");
        assert!((camera.horizontal_fov - 1.0).abs() < 1e-6);
        assert_eq!(camera.clip_plane_near, 0.5);
        assert_eq!(camera.clip_plane_far, 1000.0);

        let light = &scene.lights[0];
        assert_eq!(light.name.to_string_lossy(), "lamp");
        assert_eq!(light.light_type, LightSourceType::Spot);
        assert_eq!(light.color_diffuse, Color3::new(2.0, 1.0, 0.0));
        assert_eq!(light.attenuation_quadratic, 1.0);
        assert_eq!(light.angle_inner_cone, 0.1);
        assert_eq!(light.angle_outer_cone, 0.2);
    }

    #[test]
    fn test_skin_bones() {
        // Three vertices; joint 0 weighs every vertex, joint 1 none.
        let mut bytes = floats(&[0.0; 9]);
        bytes.extend([0u8; 12]);
        bytes.extend(floats(&[
            1.0, 0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, //
            0.5, 0.0, 0.0, 0.0,
        ]));

        let scene = convert(
            json!({
                "asset": {"version": "2.0"},
                "scenes": [{"nodes": [0]}],
                "nodes": [
                    {"name": "body", "mesh": 0, "skin": 0, "children": [1, 2]},
                    {"name": "hip"},
                    {"name": "knee"}
                ],
                "skins": [{"joints": [1, 2]}],
                "meshes": [{"primitives": [{"attributes": {"POSITION": 0, "JOINTS_0": 1, "WEIGHTS_0": 2}}]}],
                "accessors": [
                    {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"},
                    {"bufferView": 1, "componentType": 5121, "count": 3, "type": "VEC4"},
                    {"bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC4"}
                ],
                "bufferViews": [
                    {"buffer": 0, "byteLength": 36},
                    {"buffer": 0, "byteOffset": 36, "byteLength": 12},
                    {"buffer": 0, "byteOffset": 48, "byteLength": 48}
                ],
                "buffers": [{"byteLength": 96}]
            }),
            vec![bytes],
        )
        .unwrap();

        let bones = &scene.meshes[0].bones;
        assert_eq!(bones.len(), 1);
        assert_eq!(bones[0].name.to_string_lossy(), "hip");
        assert_eq!(bones[0].offset_matrix, Mat4::IDENTITY);
        assert_eq!(bones[0].weights.len(), 3);
        assert_eq!(bones[0].weights[2].weight, 0.5);
    }

    #[test]
    fn test_animation_tracks() {
        // Two keys at 0s and 0.5s.
        let mut bytes = floats(&[0.0, 0.5]);
        bytes.extend(floats(&[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]));
        bytes.extend(floats(&[0.25, 0.75, 1.0, 0.0]));

        let scene = convert(
            json!({
                "asset": {"version": "2.0"},
                "nodes": [{"name": "mover"}],
                "animations": [{
                    "channels": [
                        {"sampler": 0, "target": {"node": 0, "path": "translation"}},
                        {"sampler": 1, "target": {"node": 0, "path": "weights"}}
                    ],
                    "samplers": [
                        {"input": 0, "output": 1},
                        {"input": 0, "output": 2, "interpolation": "STEP"}
                    ]
                }],
                "accessors": [
                    {"bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR"},
                    {"bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC3"},
                    {"bufferView": 2, "componentType": 5126, "count": 4, "type": "SCALAR"}
                ],
                "bufferViews": [
                    {"buffer": 0, "byteLength": 8},
                    {"buffer": 0, "byteOffset": 8, "byteLength": 24},
                    {"buffer": 0, "byteOffset": 32, "byteLength": 16}
                ],
                "buffers": [{"byteLength": 48}]
            }),
            vec![bytes],
        )
        .unwrap();

        let animation = &scene.animations[0];
        assert_eq!(animation.name.to_string_lossy(), "animation_0");
        assert_eq!(animation.ticks_per_second, 1000.0);
        assert_eq!(animation.duration, 500.0);

        let track = &animation.channels[0];
        assert_eq!(track.node_name.to_string_lossy(), "mover");
        assert_eq!(track.position_keys[1], VectorKey::new(500.0, Vec3::new(1.0, 2.0, 3.0)));
        assert!(track.rotation_keys.is_empty());

        let morph = &animation.morph_mesh_channels[0];
        assert_eq!(morph.keys[0].values, vec![0, 1]);
        assert_eq!(morph.keys[0].weights, vec![0.25, 0.75]);
        assert_eq!(morph.keys[1].weights, vec![1.0, 0.0]);
    }

    #[test]
    fn test_cubic_spline_keeps_values() {
        let values = [
            9.0, 9.0, 9.0, 1.0, 2.0, 3.0, 9.0, 9.0, 9.0, //
            9.0, 9.0, 9.0, 4.0, 5.0, 6.0, 9.0, 9.0, 9.0,
        ];
        let keys = keyframes(&[0.0, 1.0], &values, true).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], (0.0, &[1.0, 2.0, 3.0][..]));
        assert_eq!(keys[1], (1000.0, &[4.0, 5.0, 6.0][..]));
        assert!(keyframes(&[0.0, 1.0], &values[..17], true).is_err());
    }

    #[test]
    fn test_faces_for_modes() {
        let strip = faces_for_mode(schema::MODE_TRIANGLE_STRIP, &[0, 1, 2, 3]).unwrap();
        assert_eq!(strip[0].indices.as_slice(), &[0, 1, 2]);
        assert_eq!(strip[1].indices.as_slice(), &[2, 1, 3]);

        let fan = faces_for_mode(schema::MODE_TRIANGLE_FAN, &[0, 1, 2, 3]).unwrap();
        assert_eq!(fan[1].indices.as_slice(), &[0, 2, 3]);

        let lines = faces_for_mode(schema::MODE_LINE_LOOP, &[0, 1, 2]).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].indices.as_slice(), &[2, 0]);

        assert!(faces_for_mode(7, &[0]).is_err());
    }

    #[test]
    fn test_format_hint() {
        assert_eq!(format_hint(Some("image/jpeg"), &[]), "jpg");
        assert_eq!(format_hint(None, &[0xff, 0xd8, 0xff, 0xe0]), "jpg");
        assert_eq!(format_hint(None, b"????"), "");
    }
}
