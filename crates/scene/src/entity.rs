use foundation::handles::Handle;

macro_rules! scene_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub Handle);

        impl $name {
            pub fn index(&self) -> u32 {
                self.0.index()
            }
        }
    };
}

scene_id!(
    /// A toggleable visibility group.
    GroupId
);
scene_id!(
    /// A batched triangle mesh.
    MeshId
);
scene_id!(
    /// A polyline.
    LineId
);
scene_id!(
    /// A camera-facing textured quad.
    SpriteId
);
scene_id!(
    /// An analytic shape (globe, atmosphere shell).
    ShapeId
);
scene_id!(
    /// A GPU texture owned by the texture store.
    TextureId
);
