use foundation::math::Vec3;
use foundation::math::precision::TotalF64;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit<K> {
    pub key: K,
    pub distance: f64,
    pub point: Vec3,
}

/// A screen-aligned rectangle in world space. `right` and `up` are the
/// camera basis vectors.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Billboard {
    pub center: Vec3,
    pub half_width: f64,
    pub half_height: f64,
    pub right: Vec3,
    pub up: Vec3,
}

/// Entry distance of `ray` through `billboard`, if any.
pub fn ray_billboard_t(ray: Ray, billboard: &Billboard) -> Option<f64> {
    let dir = ray.dir.normalized()?;
    let normal = billboard.right.cross(billboard.up).normalized()?;
    let denom = normal.dot(dir);
    if denom.abs() < 1e-12 {
        return None;
    }
    let t = normal.dot(billboard.center - ray.origin) / denom;
    if t < 0.0 {
        return None;
    }
    let local = ray.origin + dir.scale(t) - billboard.center;
    let x = local.dot(billboard.right.normalized()?);
    let y = local.dot(billboard.up.normalized()?);
    (x.abs() <= billboard.half_width && y.abs() <= billboard.half_height).then_some(t)
}

/// Deterministic nearest-billboard pick.
///
/// Ordering contract:
/// - The closest hit along the (normalized) ray wins.
/// - Equal distances resolve to the smaller key.
pub fn pick_billboards<K, I>(ray: Ray, items: I, opts: PickOptions) -> Option<PickHit<K>>
where
    K: Copy + Ord,
    I: IntoIterator<Item = (K, Billboard)>,
{
    let dir = ray.dir.normalized()?;
    let ray = Ray::new(ray.origin, dir);
    let (TotalF64(t), key) = items
        .into_iter()
        .filter_map(|(key, billboard)| {
            let t = ray_billboard_t(ray, &billboard)?;
            (t <= opts.max_distance).then_some((TotalF64(t), key))
        })
        .min()?;
    Some(PickHit {
        key,
        distance: t,
        point: ray.at(t),
    })
}
