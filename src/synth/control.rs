/// Linear per-sample ramp across one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRamp {
    pub start: f32,
    pub step: f32,
}

impl ControlRamp {
    pub fn for_len(start: f32, end: f32, len: usize) -> Self {
        let len = len.max(1);
        let step = (end - start) / len as f32;
        Self { start, step }
    }

    pub fn constant(value: f32) -> Self {
        Self {
            start: value,
            step: 0.0,
        }
    }

    pub fn value_at(&self, idx: usize) -> f32 {
        self.start + self.step * idx as f32
    }
}
