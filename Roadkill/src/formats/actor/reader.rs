//! Actor record decoding

use super::{Actor, ActorGraph};
use crate::error::{Error, Result, Stage};
use crate::formats::chunk::{self, ChunkHeader};
use crate::formats::common::{BinaryReader, open_resource};
use crate::formats::resource::read_file_header;
use glam::Vec3;
use std::io::{BufRead, Seek};
use std::path::Path;

/// Read every actor record in a file and merge them into one graph.
pub fn read_actor_file<P: AsRef<Path>>(path: P) -> Result<ActorGraph> {
    let path = path.as_ref();
    let mut reader = open_resource(path).map_err(|e| e.in_file(path, None))?;
    read_file_header(&mut reader).map_err(|e| e.in_file(path, None))?;
    let mut graph = ActorGraph::default();
    for (index, record) in ActorReader::new(&mut reader).enumerate() {
        graph.merge(record.map_err(|e| e.in_file(path, Some(index)))?);
    }
    tracing::info!(
        "Loaded {} actors ({} roots) from {}",
        graph.len(),
        graph.roots.len(),
        path.display()
    );
    Ok(graph)
}

/// Streams actor records out of a reader positioned after the envelope.
pub struct ActorReader<'a, R> {
    reader: &'a mut BinaryReader<R>,
    done: bool,
}

impl<'a, R: BufRead + Seek> ActorReader<'a, R> {
    pub fn new(reader: &'a mut BinaryReader<R>) -> Self {
        Self {
            reader,
            done: false,
        }
    }
}

impl<R: BufRead + Seek> Iterator for ActorReader<'_, R> {
    type Item = Result<ActorGraph>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = read_actor(self.reader).transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

enum Item {
    /// Actor with its push order.
    Actor(usize, Actor),
    Transform([f32; 12]),
    Bounds(Vec3, Vec3),
}

impl Item {
    fn kind(&self) -> &'static str {
        match self {
            Item::Actor(..) => "actor",
            Item::Transform(_) => "transform",
            Item::Bounds(..) => "bounds",
        }
    }
}

struct Loader {
    stack: Vec<Item>,
    finished: Vec<(usize, Actor)>,
    pushed: usize,
    position: u64,
}

impl Loader {
    fn fail(&self, message: String) -> Error {
        Error::ActorStack {
            message,
            position: self.position,
        }
    }

    fn push_actor(&mut self, actor: Actor) {
        self.stack.push(Item::Actor(self.pushed, actor));
        self.pushed += 1;
    }

    fn top_actor(&mut self, what: &str) -> Result<&mut Actor> {
        let position = self.position;
        let message = match self.stack.last_mut() {
            Some(Item::Actor(_, actor)) => return Ok(actor),
            Some(other) => format!("{what} needs an actor on top, found {}", other.kind()),
            None => format!("{what} on an empty stack"),
        };
        Err(Error::ActorStack { message, position })
    }

    fn pop(&mut self, what: &str) -> Result<Item> {
        self.stack
            .pop()
            .ok_or_else(|| self.fail(format!("{what} on an empty stack")))
    }

    fn attach_transform(&mut self) -> Result<()> {
        let matrix = match self.pop("attach transform")? {
            Item::Transform(m) => m,
            other => {
                return Err(self.fail(format!("attach transform popped {}", other.kind())));
            }
        };
        self.top_actor("attach transform")?.set_matrix34(&matrix);
        Ok(())
    }

    fn attach_bounds(&mut self) -> Result<()> {
        let bounds = match self.pop("attach bounds")? {
            Item::Bounds(min, max) => (min, max),
            other => return Err(self.fail(format!("attach bounds popped {}", other.kind()))),
        };
        self.top_actor("attach bounds")?.bounds = Some(bounds);
        Ok(())
    }

    fn add_child(&mut self) -> Result<()> {
        let (order, mut child) = match self.pop("add child")? {
            Item::Actor(order, actor) => (order, actor),
            other => return Err(self.fail(format!("add child popped {}", other.kind()))),
        };
        let parent = self.top_actor("add child")?;
        parent.children.push(child.name.clone());
        child.parent = Some(parent.name.clone());
        self.finished.push((order, child));
        Ok(())
    }

    fn finish(mut self) -> Result<ActorGraph> {
        for item in std::mem::take(&mut self.stack) {
            match item {
                Item::Actor(order, actor) => self.finished.push((order, actor)),
                other => {
                    return Err(self.fail(format!("unattached {} at end of record", other.kind())));
                }
            }
        }
        self.finished.sort_by_key(|(order, _)| *order);

        let mut graph = ActorGraph::default();
        for (_, actor) in self.finished {
            graph.insert_first(actor);
        }
        graph.relink();
        Ok(graph)
    }
}

/// Decode one actor record.
///
/// Returns `Ok(None)` if the stream is exhausted before the record starts.
pub fn read_actor<R: BufRead + Seek>(reader: &mut BinaryReader<R>) -> Result<Option<ActorGraph>> {
    if reader.at_end()? {
        return Ok(None);
    }
    reader.set_stage(Stage::Actor);

    let mut loader = Loader {
        stack: Vec::new(),
        finished: Vec::new(),
        pushed: 0,
        position: reader.position(),
    };

    loop {
        let header = ChunkHeader::read(reader)?;
        loader.position = header.position;
        reader.require(u64::from(header.size), header.position, chunk::tag_name(header.chunk_type))?;
        match header.chunk_type {
            chunk::END_OF_RECORD => break,
            chunk::ACTOR => {
                let visible = reader.read_u8()? == 1;
                let flags = reader.read_u8()?;
                let name = reader.read_c_string()?;
                tracing::trace!("actor {name} visible {visible}");
                loader.push_actor(Actor {
                    name,
                    visible,
                    flags,
                    ..Actor::default()
                });
            }
            chunk::ACTOR_MESH_REFERENCE => {
                let name = reader.read_c_string()?;
                loader.top_actor("mesh reference")?.mesh_name = Some(name);
            }
            chunk::ACTOR_MATERIAL_REFERENCE => {
                let name = reader.read_c_string()?;
                loader.top_actor("material reference")?.material_name = Some(name);
            }
            chunk::ACTOR_TRANSFORM => {
                let mut m = [0.0f32; 12];
                for value in &mut m {
                    *value = reader.read_f32_bits()?;
                }
                loader.stack.push(Item::Transform(m));
            }
            chunk::ACTOR_BOUNDS => {
                let mut v = [0.0f32; 6];
                for value in &mut v {
                    *value = reader.read_f32_bits()?;
                }
                loader.stack.push(Item::Bounds(
                    Vec3::new(v[0], v[1], v[2]),
                    Vec3::new(v[3], v[4], v[5]),
                ));
            }
            chunk::ACTOR_ATTACH_TRANSFORM => loader.attach_transform()?,
            chunk::ACTOR_ATTACH_BOUNDS => loader.attach_bounds()?,
            chunk::ACTOR_ADD_CHILD => loader.add_child()?,
            other => {
                return Err(loader.fail(format!(
                    "unexpected {} chunk 0x{other:x}",
                    chunk::tag_name(other)
                )));
            }
        }
    }

    let graph = loader.finish()?;
    tracing::debug!("Actor record: {} actors, roots {:?}", graph.len(), graph.roots);
    Ok(Some(graph))
}
