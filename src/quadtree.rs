use crate::{
    body::Body,
    params::Parameters,
    quadrant::{Corner, Quadrant},
    vector::Vector2D,
};

/// Deepest level a leaf may be split to. Bodies that still share a leaf at this depth
/// (coincident or nearly so) are kept together in a bucket.
pub const MAX_DEPTH: u32 = 48;

/// A body as the tree sees it: its index in the simulation plus position and mass at build time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Occupant {
    pub id: usize,
    pub pos: Vector2D,
    pub mass: f64,
}

impl Occupant {
    pub fn new(id: usize, body: &Body) -> Self {
        Self {
            id,
            pos: body.pos,
            mass: body.mass(),
        }
    }
}

/// Total mass and center of mass of everything below a node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MassAggregate {
    pub mass: f64,
    pub center: Vector2D,
}

impl MassAggregate {
    /// Folds one more point mass into the running weighted average.
    #[inline]
    pub fn add(&mut self, pos: Vector2D, mass: f64) {
        let total = self.mass + mass;
        self.center = if total > 0.0 {
            (self.center * self.mass + pos * mass) / total
        } else {
            pos
        };
        self.mass = total;
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Content {
    Empty,
    Leaf(Occupant),
    /// Only at `MAX_DEPTH`.
    Bucket(Vec<Occupant>),
    Internal,
}

/// A node of the quadtree. Children live in the owning [`Quadtree`]'s arena.
#[derive(Clone, Debug)]
pub struct Node {
    quadrant: Quadrant,
    aggregate: MassAggregate,
    content: Content,
    /// Arena indices per [`Corner`]; 0 means absent (the root is never a child).
    children: [u32; 4],
    depth: u32,
}

impl Node {
    fn new(quadrant: Quadrant, depth: u32) -> Self {
        Self {
            quadrant,
            aggregate: MassAggregate::default(),
            content: Content::Empty,
            children: [0; 4],
            depth,
        }
    }

    pub fn quadrant(&self) -> &Quadrant {
        &self.quadrant
    }

    pub fn aggregate(&self) -> MassAggregate {
        self.aggregate
    }

    pub fn mass(&self) -> f64 {
        self.aggregate.mass
    }

    pub fn center_of_mass(&self) -> Vector2D {
        self.aggregate.center
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.content == Content::Empty
    }

    pub fn is_leaf(&self) -> bool {
        self.content != Content::Internal
    }

    pub fn is_internal(&self) -> bool {
        self.content == Content::Internal
    }

    /// Bodies held directly by this node: none for empty and internal nodes.
    pub fn occupants(&self) -> &[Occupant] {
        match &self.content {
            Content::Leaf(occupant) => std::slice::from_ref(occupant),
            Content::Bucket(occupants) => occupants,
            Content::Empty | Content::Internal => &[],
        }
    }

    /// Arena indices of the existing children, in [`Corner::ALL`] order.
    pub fn child_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.children
            .iter()
            .filter(|&&c| c != 0)
            .map(|&c| c as usize)
    }

    pub fn child_index(&self, corner: Corner) -> Option<usize> {
        match self.children[corner.index()] {
            0 => None,
            c => Some(c as usize),
        }
    }
}

/// The Barnes-Hut quadtree over a fixed region.
/// Rebuilt from scratch every step and read-only while forces are evaluated.
#[derive(Clone, Debug)]
pub struct Quadtree {
    /// Gravitational constant.
    g: f64,
    /// Epsilon squared (softening parameter to avoid singularities).
    e_sq: f64,
    /// Arena of nodes; index 0 is the root.
    nodes: Vec<Node>,
    /// Bodies left out because they were outside the root region.
    escaped: usize,
}

impl Quadtree {
    pub const ROOT: usize = 0;

    /// Creates an empty tree over `bounds`.
    /// The root gets its own subdivision cache, so the cells of this tree are freed with it.
    pub fn new(bounds: Quadrant, params: &Parameters) -> Self {
        Self {
            g: params.g,
            e_sq: params.softening_sq(),
            nodes: vec![Node::new(bounds.detached(), 0)],
            escaped: 0,
        }
    }

    /// Builds the tree for one step by inserting every body in order.
    pub fn build(bounds: Quadrant, params: &Parameters, bodies: &[Body]) -> Self {
        let mut tree = Self::new(bounds, params);
        for (id, body) in bodies.iter().enumerate() {
            if !tree.insert(Occupant::new(id, body)) {
                log::trace!("body {} at {:?} is outside the simulated region", id, body.pos);
            }
        }
        if tree.escaped > 0 {
            log::debug!(
                "{} of {} bodies outside the root quadrant were left out of the tree",
                tree.escaped,
                bodies.len()
            );
        }
        log::trace!("built quadtree with {} nodes", tree.nodes.len());
        tree
    }

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    pub fn bounds(&self) -> &Quadrant {
        &self.root().quadrant
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn escaped(&self) -> usize {
        self.escaped
    }

    /// Inserts a body. A body outside the root quadrant is only counted in [`Quadtree::escaped`]
    /// and `false` is returned; it adds no mass anywhere.
    pub fn insert(&mut self, occupant: Occupant) -> bool {
        if !self.root().quadrant.contains(occupant.pos) {
            self.escaped += 1;
            return false;
        }

        let mut node = Self::ROOT;
        loop {
            self.nodes[node].aggregate.add(occupant.pos, occupant.mass);

            let depth = self.nodes[node].depth;
            match std::mem::replace(&mut self.nodes[node].content, Content::Internal) {
                Content::Empty => {
                    self.nodes[node].content = Content::Leaf(occupant);
                    return true;
                }
                Content::Leaf(existing) if depth >= MAX_DEPTH => {
                    self.nodes[node].content = Content::Bucket(vec![existing, occupant]);
                    return true;
                }
                Content::Bucket(mut occupants) => {
                    occupants.push(occupant);
                    self.nodes[node].content = Content::Bucket(occupants);
                    return true;
                }
                Content::Leaf(existing) => {
                    // Second body in this leaf: the node becomes internal and the
                    // resident moves into a fresh child.
                    let child = self.child_for(node, existing.pos);
                    self.nodes[child].aggregate.add(existing.pos, existing.mass);
                    self.nodes[child].content = Content::Leaf(existing);
                }
                Content::Internal => {}
            }

            node = self.child_for(node, occupant.pos);
        }
    }

    /// Returns the child of `node` covering `pos`, creating it on first use.
    fn child_for(&mut self, node: usize, pos: Vector2D) -> usize {
        let corner = self.nodes[node].quadrant.corner_of(pos);
        if let Some(child) = self.nodes[node].child_index(corner) {
            return child;
        }

        let quadrant = self.nodes[node].quadrant.child(corner).clone();
        let depth = self.nodes[node].depth + 1;
        let child = self.nodes.len();
        self.nodes.push(Node::new(quadrant, depth));
        self.nodes[node].children[corner.index()] = child as u32;
        child
    }

    /// Approximate net gravitational force on `body` (simulation index `id`) from everything in the tree.
    /// The body's own mass never contributes.
    pub fn compute_force(&self, id: usize, body: &Body, theta: f64) -> Vector2D {
        let mut force = Vector2D::zero();
        self.walk(Self::ROOT, id, body.pos, theta, &mut |pos, mass| {
            force += pair_force(self.g, self.e_sq, pos, mass, body.pos, body.mass());
        });
        force
    }

    /// Number of point-mass interactions `compute_force` evaluates for this body.
    pub fn interaction_count(&self, id: usize, pos: Vector2D, theta: f64) -> usize {
        let mut count = 0;
        self.walk(Self::ROOT, id, pos, theta, &mut |_, _| count += 1);
        count
    }

    /// Calls `visit` with every point mass (single body or accepted aggregate) that acts on `pos`.
    fn walk(
        &self,
        node: usize,
        id: usize,
        pos: Vector2D,
        theta: f64,
        visit: &mut impl FnMut(Vector2D, f64),
    ) {
        let n = &self.nodes[node];
        match &n.content {
            Content::Empty => {}
            Content::Leaf(occupant) => {
                if occupant.id != id {
                    visit(occupant.pos, occupant.mass);
                }
            }
            Content::Bucket(occupants) => {
                for occupant in occupants.iter().filter(|o| o.id != id) {
                    visit(occupant.pos, occupant.mass);
                }
            }
            Content::Internal => {
                // A cell holding the query point may hold the body itself, so it is always opened.
                let accept = !n.quadrant.contains(pos)
                    && n.quadrant.size() / n.quadrant.distance_to_center(pos) < theta;
                if accept {
                    visit(n.aggregate.center, n.aggregate.mass);
                } else {
                    for child in n.child_indices() {
                        self.walk(child, id, pos, theta, visit);
                    }
                }
            }
        }
    }

    /// Pre-order walk over the quadrant of every node, children in [`Corner::ALL`] order.
    pub fn quadrants(&self) -> Quadrants<'_> {
        Quadrants {
            tree: self,
            stack: vec![Self::ROOT],
        }
    }
}

/// Iterator returned by [`Quadtree::quadrants`].
pub struct Quadrants<'a> {
    tree: &'a Quadtree,
    stack: Vec<usize>,
}

impl<'a> Iterator for Quadrants<'a> {
    type Item = &'a Quadrant;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let tree: &'a Quadtree = self.tree;
        let node = &tree.nodes[index];
        self.stack.extend(node.children.iter().rev().filter(|&&c| c != 0).map(|&c| c as usize));
        Some(&node.quadrant)
    }
}

/// Softened inverse-square force on the mass `m2` at `p2`, exerted by the mass `m1` at `p1`.
/// An exactly zero softened distance gives no force instead of NaN.
#[inline]
pub fn pair_force(g: f64, e_sq: f64, p1: Vector2D, m1: f64, p2: Vector2D, m2: f64) -> Vector2D {
    let d = p1 - p2;
    let r_sq = d.mag_sq() + e_sq;
    if r_sq == 0.0 {
        return Vector2D::zero();
    }
    d * (g * m1 * m2 / (r_sq * r_sq.sqrt()))
}
