macro_rules! expect_if {
    ($self:ident, $( $pattern:pat_param )|+ $( if $guard: expr )?) => {
        match $self.kind() {
            $( $pattern )|+ $( if $guard )? => {
                $self.bump();
                true
            },
            _ => false
        }
    }
}

macro_rules! peek {
    ($self:ident, $( $pattern:pat_param )|+ $( if $guard: expr )?) => {
        match $self.kind() {
            $( $pattern )|+ $( if $guard )? => true,
            _ => false
        }
    }
}

macro_rules! peek_at {
    ($self:ident, $n:expr, $( $pattern:pat_param )|+) => {
        match $self.kind_at($n) {
            $( $pattern )|+ => true,
            _ => false
        }
    }
}
